//! 成功模式分析服务 - 业务能力层

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::ApiClient;
use crate::models::YouTubeVideo;

/// 随字幕一起发送的视频元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMetadata<'a> {
    pub title: &'a str,
    pub view_count: u64,
    pub cii: f64,
    pub engagement_rate: f64,
}

/// 模式分析请求
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRequest<'a> {
    pub video_id: &'a str,
    pub transcript: &'a str,
    pub metadata: PatternMetadata<'a>,
}

impl<'a> PatternRequest<'a> {
    pub fn new(video: &'a YouTubeVideo, transcript: &'a str) -> Self {
        Self {
            video_id: &video.video_id,
            transcript,
            metadata: PatternMetadata {
                title: &video.title,
                view_count: video.view_count,
                cii: video.cii,
                engagement_rate: video.engagement_rate,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatternResponse {
    #[serde(default)]
    analysis: Option<JsonValue>,
}

/// 模式分析服务
pub struct PatternService {
    client: ApiClient,
}

impl PatternService {
    pub const ENDPOINT: &'static str = "/api/analyze-patterns";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 分析字幕中的成功模式
    ///
    /// 后端的 `analysis` 可能是文本也可能是对象，
    /// 对象会被格式化成 JSON 文本。
    pub async fn analyze(&self, request: &PatternRequest<'_>) -> AppResult<String> {
        debug!(
            "模式分析: {} (字幕 {} 字符)",
            request.video_id,
            request.transcript.chars().count()
        );

        let response: PatternResponse = self.client.post_json(Self::ENDPOINT, request).await?;

        match response.analysis {
            Some(JsonValue::String(text)) if !text.trim().is_empty() => Ok(text),
            Some(value @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
                serde_json::to_string_pretty(&value).map_err(|e| {
                    ApiError::JsonParseFailed {
                        endpoint: Self::ENDPOINT.to_string(),
                        source: e,
                    }
                    .into()
                })
            }
            _ => Err(AppError::empty_response(Self::ENDPOINT, "analysis")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_request_wire_shape() {
        let video = YouTubeVideo {
            video_id: "v1".into(),
            title: "Title".into(),
            view_count: 42,
            cii: 71.5,
            engagement_rate: 2.5,
            ..Default::default()
        };
        let request = PatternRequest::new(&video, "번역된 대본");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "videoId": "v1",
                "transcript": "번역된 대본",
                "metadata": {
                    "title": "Title",
                    "viewCount": 42,
                    "cii": 71.5,
                    "engagementRate": 2.5
                }
            })
        );
    }
}
