//! 导出写入服务 - 业务能力层
//!
//! 只负责"把结果写成文件"能力，不关心流程

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AppResult, FileError};
use crate::models::{ExportRecord, YouTubeVideo};

/// CSV 导出的固定文件名
pub const CSV_FILE_NAME: &str = "tubelens_analysis.csv";

const CSV_HEADER: &str = "제목,채널,조회수,좋아요,구독자수,CII,참여율,성과등급";

/// 导出写入服务
///
/// 职责：
/// - 批量分析结果 → JSON
/// - 视频列表 → CSV
/// - 字幕 / 脚本 → 纯文本
pub struct ExportWriter {
    export_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// `batch-analysis-results-YYYY-MM-DD.json`
    pub fn batch_file_name(date: NaiveDate) -> String {
        format!("batch-analysis-results-{}.json", date.format("%Y-%m-%d"))
    }

    /// 写入批量分析结果（只包含已完成条目）
    pub async fn write_batch_results(&self, records: &[ExportRecord<'_>]) -> AppResult<PathBuf> {
        let file_name = Self::batch_file_name(chrono::Utc::now().date_naive());
        let content = to_pretty_json(&file_name, records)?;

        let path = self.write_file(&file_name, &content).await?;
        info!("💾 已导出 {} 条分析结果: {}", records.len(), path.display());
        Ok(path)
    }

    /// 写入视频列表 CSV
    pub async fn write_videos_csv(&self, videos: &[YouTubeVideo]) -> AppResult<PathBuf> {
        let path = self.write_file(CSV_FILE_NAME, &render_csv(videos)).await?;
        info!("💾 已导出 {} 个视频: {}", videos.len(), path.display());
        Ok(path)
    }

    /// 写入纯文本（字幕、脚本）
    pub async fn write_text(&self, file_name: &str, content: &str) -> AppResult<PathBuf> {
        self.write_file(&sanitize_file_name(file_name), content).await
    }

    async fn write_file(&self, file_name: &str, content: &str) -> AppResult<PathBuf> {
        let path = self.export_dir.join(file_name);
        debug!("写入文件: {} ({} 字节)", path.display(), content.len());

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| FileError::WriteFailed {
                path: self.export_dir.display().to_string(),
                source: e,
            })?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| FileError::WriteFailed {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(path)
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(file_name: &str, value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        FileError::SerializeFailed {
            path: file_name.to_string(),
            source: e,
        }
        .into()
    })
}

/// 渲染 CSV，标题和频道名总是加引号
pub fn render_csv(videos: &[YouTubeVideo]) -> String {
    let mut lines = Vec::with_capacity(videos.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(videos.iter().map(|v| {
        format!(
            "{},{},{},{},{},{:.1},{:.1}%,{}",
            quote(&v.title),
            quote(&v.channel_title),
            v.view_count,
            v.like_count,
            v.subscriber_count,
            v.cii,
            v.engagement_rate,
            v.performance_level.as_str()
        )
    }));
    lines.join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// 去掉文件名里的路径分隔符和控制字符
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "untitled.txt".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformanceLevel;

    #[test]
    fn test_batch_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            ExportWriter::batch_file_name(date),
            "batch-analysis-results-2024-03-07.json"
        );
    }

    #[test]
    fn test_render_csv() {
        let videos = vec![YouTubeVideo {
            video_id: "a".into(),
            title: "say \"hi\"".into(),
            channel_title: "채널, 하나".into(),
            view_count: 1200,
            like_count: 30,
            subscriber_count: 500,
            cii: 87.26,
            engagement_rate: 4.0,
            performance_level: PerformanceLevel::Great,
            ..Default::default()
        }];

        let csv = render_csv(&videos);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            r#""say ""hi""","채널, 하나",1200,30,500,87.3,4.0%,great"#
        );
    }

    #[test]
    fn test_serialize_failure_is_a_file_error() {
        use crate::error::AppError;
        use std::collections::HashMap;

        // 非字符串键无法写成 JSON 对象
        let bad: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let err = to_pretty_json("batch.json", &bad).unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::SerializeFailed { ref path, .. }) if path == "batch.json"
        ));

        let ok = to_pretty_json("batch.json", &[1, 2]).unwrap();
        assert!(ok.contains('1'));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b:c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_file_name("  "), "untitled.txt");
    }

    #[tokio::test]
    async fn test_write_videos_csv_creates_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path().join("out"));

        let path = writer.write_videos_csv(&[]).await.unwrap();

        assert_eq!(path.file_name().unwrap(), CSV_FILE_NAME);
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, CSV_HEADER);
    }
}
