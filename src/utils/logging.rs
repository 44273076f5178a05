/// 日志工具模块
///
/// 提供批量运行日志文件和横幅输出的辅助函数
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;

use crate::config::Config;
use crate::orchestrator::BatchSnapshot;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量视频分析日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 tubelens 启动");
    info!("🌐 后端地址: {}", config.api_base_url);
    info!("💾 会话目录: {}", config.storage_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录批量分析开始
///
/// # 参数
/// - `total`: 视频总数
/// - `delay_ms`: 相邻视频之间的间隔
pub fn log_batch_start(total: usize, delay_ms: u128) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量分析: 共 {} 个视频", total);
    info!("💡 逐个顺序处理，每个视频之间间隔 {} ms", delay_ms);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `snapshot`: 运行结束时的快照
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(snapshot: &BatchSnapshot, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批量分析完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", snapshot.completed_count(), snapshot.total);
    info!("❌ 失败: {}", snapshot.failed_count());
    info!("📈 进度: {}%", snapshot.percent());
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
