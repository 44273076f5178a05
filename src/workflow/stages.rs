//! 流水线阶段
//!
//! 每个阶段都是 `(输入) -> Result<输出, 错误>` 的异步函数。
//! 流程层只依赖这三个 trait，测试里可以换成不访问网络的实现。

use std::future::Future;

use crate::error::AppResult;
use crate::services::translation_service::TARGET_LANGUAGE;
use crate::services::{PatternRequest, PatternService, TranscriptService, TranslationService};

/// 阶段 1：按视频 ID 提取字幕，没有可用文本时返回 `Ok(None)`
pub trait TranscriptStage: Send + Sync {
    fn extract_transcript(
        &self,
        video_id: &str,
    ) -> impl Future<Output = AppResult<Option<String>>> + Send;
}

/// 阶段 2：翻译成韩文
pub trait TranslationStage: Send + Sync {
    fn translate_to_korean(&self, text: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// 阶段 3：成功模式分析
pub trait AnalysisStage: Send + Sync {
    fn analyze_patterns(
        &self,
        request: &PatternRequest<'_>,
    ) -> impl Future<Output = AppResult<String>> + Send;
}

impl TranscriptStage for TranscriptService {
    async fn extract_transcript(&self, video_id: &str) -> AppResult<Option<String>> {
        self.extract(video_id).await
    }
}

impl TranslationStage for TranslationService {
    async fn translate_to_korean(&self, text: &str) -> AppResult<String> {
        self.translate(text, TARGET_LANGUAGE).await
    }
}

impl AnalysisStage for PatternService {
    async fn analyze_patterns(&self, request: &PatternRequest<'_>) -> AppResult<String> {
        self.analyze(request).await
    }
}
