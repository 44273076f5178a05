//! 会话字段的持久化键
//!
//! 写入和重置共用同一个枚举，新增字段只需要在这里登记一次。

use std::fmt;

/// 会话字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    SearchResults,
    FilteredVideos,
    SelectedVideo,
    AiAnalysis,
    GeneratedScript,
    ExtractedTranscript,
    SelectedVideos,
    CachedTrendingData,
    ViralPatternsData,
    ViralPatternsKeyword,
    HybridAnalysisData,
    HybridAnalysisKeyword,
    ChannelViralData,
    ShoppingChannelViralData,
    TitleAnalysis,
    ThumbnailAnalysis,
    PopularTitles,
    ContentRecommendations,
    ChannelViralKeyword,
}

impl SessionKey {
    /// 全部保留键，顺序即下标
    pub const ALL: [SessionKey; 19] = [
        SessionKey::SearchResults,
        SessionKey::FilteredVideos,
        SessionKey::SelectedVideo,
        SessionKey::AiAnalysis,
        SessionKey::GeneratedScript,
        SessionKey::ExtractedTranscript,
        SessionKey::SelectedVideos,
        SessionKey::CachedTrendingData,
        SessionKey::ViralPatternsData,
        SessionKey::ViralPatternsKeyword,
        SessionKey::HybridAnalysisData,
        SessionKey::HybridAnalysisKeyword,
        SessionKey::ChannelViralData,
        SessionKey::ShoppingChannelViralData,
        SessionKey::TitleAnalysis,
        SessionKey::ThumbnailAnalysis,
        SessionKey::PopularTitles,
        SessionKey::ContentRecommendations,
        SessionKey::ChannelViralKeyword,
    ];

    /// 持久化介质中的键名
    pub fn storage_key(self) -> &'static str {
        match self {
            SessionKey::SearchResults => "tubelens_searchResults",
            SessionKey::FilteredVideos => "tubelens_filteredVideos",
            SessionKey::SelectedVideo => "tubelens_selectedVideo",
            SessionKey::AiAnalysis => "tubelens_aiAnalysis",
            SessionKey::GeneratedScript => "tubelens_generatedScript",
            SessionKey::ExtractedTranscript => "tubelens_extractedTranscript",
            SessionKey::SelectedVideos => "tubelens_selectedVideos",
            SessionKey::CachedTrendingData => "tubelens_cachedTrendingData",
            SessionKey::ViralPatternsData => "tubelens_viralPatternsData",
            SessionKey::ViralPatternsKeyword => "tubelens_viralPatternsKeyword",
            SessionKey::HybridAnalysisData => "tubelens_hybridAnalysisData",
            SessionKey::HybridAnalysisKeyword => "tubelens_hybridAnalysisKeyword",
            SessionKey::ChannelViralData => "tubelens_channelViralData",
            SessionKey::ShoppingChannelViralData => "tubelens_shoppingChannelViralData",
            SessionKey::TitleAnalysis => "tubelens_titleAnalysis",
            SessionKey::ThumbnailAnalysis => "tubelens_thumbnailAnalysis",
            SessionKey::PopularTitles => "tubelens_popularTitles",
            SessionKey::ContentRecommendations => "tubelens_contentRecommendations",
            SessionKey::ChannelViralKeyword => "tubelens_channelViralKeyword",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_keys_are_distinct_and_prefixed() {
        let names: HashSet<&str> = SessionKey::ALL.iter().map(|k| k.storage_key()).collect();
        assert_eq!(names.len(), 19);
        assert!(names.iter().all(|n| n.starts_with("tubelens_")));
    }

    #[test]
    fn test_index_matches_position() {
        for (i, key) in SessionKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }
}
