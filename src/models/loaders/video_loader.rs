use crate::error::FileError;
use crate::models::video::YouTubeVideo;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 视频列表文件可以是裸数组，也可以是 `{ videos = [...] }` 形式（例如搜索结果）
#[derive(Deserialize)]
#[serde(untagged)]
enum VideoListFile {
    List(Vec<YouTubeVideo>),
    Wrapped { videos: Vec<YouTubeVideo> },
}

impl VideoListFile {
    fn into_videos(self) -> Vec<YouTubeVideo> {
        match self {
            VideoListFile::List(videos) | VideoListFile::Wrapped { videos } => videos,
        }
    }
}

/// TOML 顶层必须是表，所以只支持 `[[videos]]` 形式
#[derive(Deserialize)]
struct TomlVideoList {
    videos: Vec<YouTubeVideo>,
}

/// 从 JSON 或 TOML 文件加载视频列表
///
/// 失败时错误链的根是 `FileError`，外层带上下文说明。
pub async fn load_videos(path: &Path) -> Result<Vec<YouTubeVideo>> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    if !matches!(extension.as_deref(), Some("json") | Some("toml")) {
        return Err(FileError::UnsupportedFormat { path: display })
            .context("视频列表只支持 .json / .toml");
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::ReadFailed {
            path: display.clone(),
            source: e,
        })
        .with_context(|| format!("无法读取视频列表文件: {}", display))?;

    let parsed = match extension.as_deref() {
        Some("json") => parse_json_videos(&content),
        _ => parse_toml_videos(&content),
    };
    let videos = parsed
        .map_err(|e| FileError::ParseFailed {
            path: display.clone(),
            message: e.to_string(),
        })
        .with_context(|| format!("无法解析视频列表文件: {}", display))?;

    tracing::info!(
        "成功加载 {} 个视频: {}",
        videos.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(videos)
}

pub fn parse_json_videos(content: &str) -> Result<Vec<YouTubeVideo>> {
    let file: VideoListFile = serde_json::from_str(content)?;
    Ok(file.into_videos())
}

pub fn parse_toml_videos(content: &str) -> Result<Vec<YouTubeVideo>> {
    let file: TomlVideoList = toml::from_str(content)?;
    Ok(file.videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array_and_wrapped() {
        let list = r#"[{"videoId":"a","title":"A"},{"videoId":"b"}]"#;
        let videos = parse_json_videos(list).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "A");

        let wrapped = r#"{
            "videos": [{ "videoId": "c", "viewCount": 10 }],
            "summary": { "total": 1, "great": 0, "good": 0, "normal": 1 }
        }"#;
        let videos = parse_json_videos(wrapped).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].view_count, 10);
    }

    #[test]
    fn test_parse_toml_videos() {
        let content = r#"
            [[videos]]
            videoId = "a"
            title = "첫 번째 영상"
            viewCount = 1500000
            cii = 92.1
            engagementRate = 3.4

            [[videos]]
            videoId = "b"
        "#;
        let videos = parse_toml_videos(content).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].view_count, 1_500_000);
        assert_eq!(videos[1].video_id, "b");
    }

    #[tokio::test]
    async fn test_load_videos_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        std::fs::write(&path, "videoId\na").unwrap();

        let err = load_videos(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_videos_reports_read_and_parse_failures() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        let err = load_videos(&missing).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::ReadFailed { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "videos = [").unwrap();
        let err = load_videos(&broken).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::ParseFailed { .. })
        ));

        let ok = dir.path().join("videos.json");
        std::fs::write(&ok, r#"[{"videoId":"a"}]"#).unwrap();
        assert_eq!(load_videos(&ok).await.unwrap().len(), 1);
    }
}
