use serde::{Deserialize, Serialize};

/// 后端划分的表现等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Great,
    Good,
    #[default]
    Normal,
}

impl PerformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Great => "great",
            PerformanceLevel::Good => "good",
            PerformanceLevel::Normal => "normal",
        }
    }
}

/// 单个 YouTube 视频
///
/// 所有指标（cii、engagement_rate、performance_level）都由后端计算，这里只透传。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeVideo {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_created_at: Option<String>,
    #[serde(default)]
    pub published_at: String,
    /// ISO-8601 时长，如 `PT4M13S`
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub subscriber_count: u64,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub performance_level: PerformanceLevel,
    /// 综合兴趣指数（Composite Interest Index）
    #[serde(default)]
    pub cii: f64,
    #[serde(default)]
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[serde(rename = "viewCount")]
    ViewCount,
    #[serde(rename = "date")]
    Date,
    #[default]
    #[serde(rename = "relevance")]
    Relevance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishTime {
    #[default]
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoDuration {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

/// 搜索参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub keyword: String,
    pub sort_order: SortOrder,
    pub publish_time: PublishTime,
    pub video_duration: VideoDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_keywords: Option<String>,
}

impl SearchParams {
    /// 热门话题点击后使用的默认搜索参数
    pub fn trending(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            sort_order: SortOrder::Relevance,
            publish_time: PublishTime::Week,
            video_duration: VideoDuration::Any,
            exclude_keywords: Some(String::new()),
        }
    }
}

/// 各表现等级的数量汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchSummary {
    pub total: u64,
    pub great: u64,
    pub good: u64,
    pub normal: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResults {
    pub videos: Vec<YouTubeVideo>,
    #[serde(default)]
    pub summary: SearchSummary,
}

/// AI 内容推荐结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub suggested_titles: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFormat {
    #[default]
    Shorts,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTone {
    #[default]
    Friendly,
    Professional,
    Casual,
    Enthusiastic,
}

/// 脚本生成选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScriptOptions {
    pub format: ScriptFormat,
    pub tone: ScriptTone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_deserializes_from_camel_case_with_missing_fields() {
        let video: YouTubeVideo = serde_json::from_value(json!({
            "videoId": "abc",
            "title": "테스트 영상",
            "viewCount": 1200,
            "performanceLevel": "great",
            "cii": 87.5,
            "engagementRate": 4.2
        }))
        .unwrap();

        assert_eq!(video.video_id, "abc");
        assert_eq!(video.view_count, 1200);
        assert_eq!(video.performance_level, PerformanceLevel::Great);
        assert!(video.tags.is_empty());
        assert!(video.channel_created_at.is_none());
    }

    #[test]
    fn test_search_params_wire_names() {
        let params = SearchParams {
            keyword: "요리".to_string(),
            sort_order: SortOrder::ViewCount,
            publish_time: PublishTime::Month,
            video_duration: VideoDuration::Short,
            exclude_keywords: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "keyword": "요리",
                "sortOrder": "viewCount",
                "publishTime": "month",
                "videoDuration": "short"
            })
        );
    }
}
