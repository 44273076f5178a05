//! 字幕提取服务 - 业务能力层
//!
//! 只负责"按视频 ID 取字幕"能力，不关心流程

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::ApiClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    video_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    transcript: Option<String>,
}

/// 字幕提取服务
pub struct TranscriptService {
    client: ApiClient,
}

impl TranscriptService {
    pub const ENDPOINT: &'static str = "/api/extract-transcript";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 提取字幕
    ///
    /// # 返回
    /// 后端没有返回可用文本（字段缺失或为空白）时返回 `Ok(None)`
    pub async fn extract(&self, video_id: &str) -> AppResult<Option<String>> {
        debug!("提取字幕: {}", video_id);

        let response: ExtractResponse = self
            .client
            .post_json(Self::ENDPOINT, &ExtractRequest { video_id })
            .await?;

        Ok(response.transcript.filter(|t| !t.trim().is_empty()))
    }
}
