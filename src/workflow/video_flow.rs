//! 视频处理流程 - 流程层
//!
//! 核心职责：定义"一个视频"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取字幕（失败 → 条目失败）
//! 2. 没有韩文时翻译（失败 → 退回原文，继续）
//! 3. 模式分析（失败 → 条目失败，保留字幕和译文）

use tracing::{info, warn};

use crate::error::AppError;
use crate::infrastructure::ApiClient;
use crate::models::{BatchItem, ItemStatus, YouTubeVideo};
use crate::services::{PatternRequest, PatternService, TranscriptService, TranslationService};
use crate::utils::{contains_hangul, truncate_text};
use crate::workflow::item_ctx::ItemCtx;
use crate::workflow::stages::{AnalysisStage, TranscriptStage, TranslationStage};

/// 字幕缺失时写入条目的失败原因
pub const TRANSCRIPT_MISSING: &str = "Failed to extract transcript";

/// 错误没有可读信息时的失败原因
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// 视频处理流程
///
/// - 编排三个阶段的顺序和分支
/// - 只通过 `BatchItem` 的状态机方法修改条目
/// - 从不向调用方返回错误
pub struct VideoFlow<X = TranscriptService, T = TranslationService, A = PatternService> {
    extractor: X,
    translator: T,
    analyzer: A,
}

impl VideoFlow {
    /// 使用真实后端服务创建流程
    pub fn from_client(client: &ApiClient) -> Self {
        Self::new(
            TranscriptService::new(client.clone()),
            TranslationService::new(client.clone()),
            PatternService::new(client.clone()),
        )
    }
}

impl<X, T, A> VideoFlow<X, T, A>
where
    X: TranscriptStage,
    T: TranslationStage,
    A: AnalysisStage,
{
    pub fn new(extractor: X, translator: T, analyzer: A) -> Self {
        Self {
            extractor,
            translator,
            analyzer,
        }
    }

    /// 处理一个视频，结果写回 `record`
    ///
    /// `record` 必须已经处于 `processing` 状态。
    pub async fn run(
        &self,
        record: &mut BatchItem,
        video: &YouTubeVideo,
        ctx: &ItemCtx,
    ) -> ItemStatus {
        info!("{} 🎬 {}", ctx, truncate_text(&video.title, 60));

        // ========== 阶段 1: 提取字幕 ==========
        let transcript = match self.extractor.extract_transcript(&video.video_id).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("{} ⚠️ 没有可用字幕", ctx);
                record.fail(TRANSCRIPT_MISSING, None, None, false);
                return record.status;
            }
            Err(e) => {
                warn!("{} ❌ 字幕提取失败: {}", ctx, e);
                record.fail(failure_reason(&e), None, None, false);
                return record.status;
            }
        };
        info!(
            "{} ✓ 字幕提取完成 ({} 字符)",
            ctx,
            transcript.chars().count()
        );

        // ========== 阶段 2: 按需翻译 ==========
        let (translation, degraded) = self.translate_if_needed(&transcript, ctx).await;

        // ========== 阶段 3: 模式分析 ==========
        let request = PatternRequest::new(video, &translation);
        match self.analyzer.analyze_patterns(&request).await {
            Ok(analysis) => {
                info!("{} ✅ 分析完成", ctx);
                record.complete(transcript, translation, analysis, degraded);
            }
            Err(e) => {
                warn!("{} ❌ 模式分析失败: {}", ctx, e);
                record.fail(
                    failure_reason(&e),
                    Some(transcript),
                    Some(translation),
                    degraded,
                );
            }
        }

        record.status
    }

    /// 返回 (译文, 是否退回了原文)
    async fn translate_if_needed(&self, transcript: &str, ctx: &ItemCtx) -> (String, bool) {
        if contains_hangul(transcript) {
            info!("{} 字幕已是韩文，跳过翻译", ctx);
            return (transcript.to_string(), false);
        }

        match self.translator.translate_to_korean(transcript).await {
            Ok(translated) => {
                info!("{} ✓ 翻译完成", ctx);
                (translated, false)
            }
            Err(e) => {
                warn!("{} ⚠️ 翻译失败，使用原文继续: {}", ctx, e);
                (transcript.to_string(), true)
            }
        }
    }
}

fn failure_reason(err: &AppError) -> String {
    let message = err.user_message();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! 不访问网络的阶段实现，按视频 ID / 文本返回预设结果

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{ApiError, AppResult};

    fn bad_response(endpoint: &str, message: &str) -> AppError {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: 500,
            message: Some(message.to_string()),
        })
    }

    /// 记录每个阶段的调用顺序
    pub type CallLog = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    pub struct FakeExtractor {
        pub transcripts: HashMap<String, Option<String>>,
        pub failing: HashMap<String, String>,
        pub calls: CallLog,
    }

    impl TranscriptStage for FakeExtractor {
        async fn extract_transcript(&self, video_id: &str) -> AppResult<Option<String>> {
            self.calls.lock().unwrap().push(format!("extract:{}", video_id));
            if let Some(message) = self.failing.get(video_id) {
                return Err(bad_response("/api/extract-transcript", message));
            }
            Ok(self.transcripts.get(video_id).cloned().flatten())
        }
    }

    #[derive(Default)]
    pub struct FakeTranslator {
        pub fail: bool,
        pub calls: CallLog,
    }

    impl TranslationStage for FakeTranslator {
        async fn translate_to_korean(&self, text: &str) -> AppResult<String> {
            self.calls.lock().unwrap().push(format!("translate:{}", text));
            if self.fail {
                return Err(AppError::empty_response("/api/translate", "translation"));
            }
            Ok(format!("[ko] {}", text))
        }
    }

    #[derive(Default)]
    pub struct FakeAnalyzer {
        pub failing: HashMap<String, String>,
        pub calls: CallLog,
    }

    impl AnalysisStage for FakeAnalyzer {
        async fn analyze_patterns(&self, request: &PatternRequest<'_>) -> AppResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("analyze:{}", request.video_id));
            if let Some(message) = self.failing.get(request.video_id) {
                return Err(bad_response("/api/analyze-patterns", message));
            }
            Ok(format!("analysis of {}", request.transcript))
        }
    }

    pub fn video(id: &str) -> YouTubeVideo {
        YouTubeVideo {
            video_id: id.to_string(),
            title: format!("title {}", id),
            view_count: 1_000,
            cii: 80.0,
            engagement_rate: 3.5,
            ..Default::default()
        }
    }
}
