use anyhow::Result;
use clap::Parser;

use tubelens::cli::{self, Cli};
use tubelens::utils::logging::log_startup;
use tubelens::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    tubelens::logger::init(args.verbose || config.verbose_logging);
    log_startup(&config);

    // 恢复会话
    let mut app = App::initialize(config)?;
    if let Some(notice) = app.take_restore_notice() {
        println!("{}", notice);
    }

    let result = cli::execute(&mut app, args.command).await;

    // 无论成功与否都等待会话写入完成
    app.flush().await;

    result
}
