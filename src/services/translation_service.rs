//! 翻译服务 - 业务能力层

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::ApiClient;

/// 批量分析统一翻译成韩文
pub const TARGET_LANGUAGE: &str = "ko";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    text: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translation: Option<String>,
}

/// 翻译服务
pub struct TranslationService {
    client: ApiClient,
}

impl TranslationService {
    pub const ENDPOINT: &'static str = "/api/translate";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 翻译文本，后端没有返回译文视为失败
    pub async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        debug!(
            "翻译文本: {} 字符 → {}",
            text.chars().count(),
            target_language
        );

        let response: TranslateResponse = self
            .client
            .post_json(
                Self::ENDPOINT,
                &TranslateRequest {
                    text,
                    target_language,
                },
            )
            .await?;

        response
            .translation
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::empty_response(Self::ENDPOINT, "translation"))
    }
}
