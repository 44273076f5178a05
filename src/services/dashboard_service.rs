//! 仪表盘服务 - 业务能力层
//!
//! 每个方法对应一个后端接口，只做请求 / 响应的类型转换，
//! 不做校验也不碰会话状态。

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::ApiClient;
use crate::models::{AiAnalysis, ScriptOptions, SearchParams, SearchResults, YouTubeVideo};

#[derive(Serialize, Deserialize)]
struct VideoList {
    #[serde(default)]
    videos: Vec<YouTubeVideo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AiAnalysisRequest<'a> {
    video_id: &'a str,
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
}

/// 生成的脚本
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedScript {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub id: Option<JsonValue>,
}

/// 选中频道的 100万+ 爆款分析
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelViralReport {
    #[serde(default)]
    pub channel_data: Option<JsonValue>,
    #[serde(default)]
    pub shopping_channel_data: Option<JsonValue>,
    #[serde(default)]
    pub title_analysis: Option<JsonValue>,
    #[serde(default)]
    pub thumbnail_analysis: Option<JsonValue>,
    #[serde(default)]
    pub popular_titles: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub content_recommendations: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub summary: Option<JsonValue>,
}

impl ChannelViralReport {
    pub fn total_viral_videos(&self) -> u64 {
        summary_count(self.summary.as_ref(), "totalViralVideos")
    }
}

/// 从不透明的分析结果中读取 `summary.<field>` 计数，缺失时为 0
pub fn summary_count(summary_holder: Option<&JsonValue>, field: &str) -> u64 {
    summary_holder
        .and_then(|v| v.get(field).or_else(|| v.get("summary").and_then(|s| s.get(field))))
        .and_then(JsonValue::as_u64)
        .unwrap_or(0)
}

/// 仪表盘服务
pub struct DashboardService {
    client: ApiClient,
}

impl DashboardService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 搜索视频
    pub async fn search(&self, params: &SearchParams) -> AppResult<SearchResults> {
        debug!("搜索视频: {:?}", params.keyword);
        self.client.post_json("/api/search", params).await
    }

    /// Great!! 筛选
    pub async fn filter_great(&self, videos: &[YouTubeVideo]) -> AppResult<Vec<YouTubeVideo>> {
        let response: VideoList = self
            .client
            .post_json(
                "/api/filter-great",
                &VideoList {
                    videos: videos.to_vec(),
                },
            )
            .await?;
        Ok(response.videos)
    }

    /// AI 内容推荐
    pub async fn ai_analysis(&self, video: &YouTubeVideo) -> AppResult<AiAnalysis> {
        self.client
            .post_json(
                "/api/ai-analysis",
                &AiAnalysisRequest {
                    video_id: &video.video_id,
                    title: &video.title,
                    description: &video.description,
                    tags: &video.tags,
                },
            )
            .await
    }

    pub async fn generate_script(&self, options: &ScriptOptions) -> AppResult<GeneratedScript> {
        self.client.post_json("/api/generate-script", options).await
    }

    /// 新兴频道爆款模式分析
    pub async fn analyze_new_channels(
        &self,
        keyword: &str,
        exclude_keywords: Option<&str>,
    ) -> AppResult<JsonValue> {
        let mut body = json!({ "keyword": keyword });
        if let Some(exclude) = exclude_keywords {
            body["excludeKeywords"] = json!(exclude);
        }
        self.client.post_json("/api/analyze-new-channels", &body).await
    }

    /// 按频道分析爆款模式（旧接口）
    pub async fn analyze_channels_viral(&self, channel_ids: &[String]) -> AppResult<JsonValue> {
        self.client
            .post_json(
                "/api/analyze-channels-viral",
                &json!({ "channelIds": channel_ids }),
            )
            .await
    }

    /// 老频道 vs 新频道对比
    pub async fn hybrid_analysis(&self, keyword: &str) -> AppResult<JsonValue> {
        self.client
            .post_json("/api/hybrid-analysis", &json!({ "keyword": keyword }))
            .await
    }

    pub async fn analyze_selected_channels_viral(
        &self,
        channel_ids: &[String],
    ) -> AppResult<ChannelViralReport> {
        self.client
            .post_json(
                "/api/analyze-selected-channels-viral",
                &json!({ "channelIds": channel_ids }),
            )
            .await
    }

    pub async fn trending_topics(&self) -> AppResult<JsonValue> {
        self.client.get_json("/api/trending-topics").await
    }

    /// 已保存的脚本列表，按后端返回顺序
    pub async fn list_scripts(&self) -> AppResult<Vec<JsonValue>> {
        self.client.get_json("/api/scripts").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_count() {
        let data = json!({ "summary": { "viralVideos": 7 } });
        assert_eq!(summary_count(Some(&data), "viralVideos"), 7);
        assert_eq!(summary_count(Some(&json!({ "totalViralVideos": 3 })), "totalViralVideos"), 3);
        assert_eq!(summary_count(Some(&json!({})), "viralVideos"), 0);
        assert_eq!(summary_count(None, "viralVideos"), 0);
    }

    #[test]
    fn test_channel_viral_report_tolerates_missing_fields() {
        let report: ChannelViralReport = serde_json::from_value(json!({
            "channelData": [{ "channelId": "c1" }],
            "summary": { "totalViralVideos": 12 }
        }))
        .unwrap();

        assert!(report.channel_data.is_some());
        assert!(report.popular_titles.is_none());
        assert_eq!(report.total_viral_videos(), 12);
    }
}
