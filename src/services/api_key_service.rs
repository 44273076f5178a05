//! YouTube API 密钥管理服务 - 业务能力层
//!
//! 密钥和配额状态都保存在后端，这里只转发操作。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ValidationError};
use crate::infrastructure::ApiClient;
use crate::models::{ApiKeyRecord, KeyTestResult};

const API_KEYS_ENDPOINT: &str = "/api/settings/api-keys";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiKeyList {
    #[serde(default)]
    api_keys: Vec<ApiKeyRecord>,
}

#[derive(Serialize)]
struct NewApiKey<'a> {
    name: &'a str,
    key: &'a str,
}

/// 密钥管理服务
pub struct ApiKeyService {
    client: ApiClient,
}

impl ApiKeyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> AppResult<Vec<ApiKeyRecord>> {
        let response: ApiKeyList = self.client.get_json(API_KEYS_ENDPOINT).await?;
        Ok(response.api_keys)
    }

    /// 添加密钥，名称和密钥值都不能为空
    pub async fn add(&self, name: &str, key: &str) -> AppResult<()> {
        let (name, key) = (name.trim(), key.trim());
        if name.is_empty() || key.is_empty() {
            return Err(ValidationError::EmptyApiKeyFields.into());
        }
        self.client
            .post_json_status(API_KEYS_ENDPOINT, &NewApiKey { name, key })
            .await
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(&format!("{}/{}", API_KEYS_ENDPOINT, id))
            .await
    }

    pub async fn activate(&self, id: &str) -> AppResult<()> {
        self.client
            .post_status(&format!("{}/{}/activate", API_KEYS_ENDPOINT, id))
            .await
    }

    /// 测试密钥
    ///
    /// 后端用错误状态码报告"密钥不可用"时，仍然返回一个失败的测试结果。
    pub async fn test(&self, id: &str) -> AppResult<KeyTestResult> {
        let endpoint = format!("{}/{}/test", API_KEYS_ENDPOINT, id);
        match self.client.post_empty::<KeyTestResult>(&endpoint).await {
            Ok(result) => Ok(result),
            Err(AppError::Api(api)) if api.is_bad_response() => Ok(KeyTestResult {
                success: false,
                quota_info: None,
                error: api.server_message().map(str::to_string),
            }),
            Err(e) => Err(e),
        }
    }

    /// 切换到下一个可用密钥
    ///
    /// # 返回
    /// 后端拒绝（没有其他可用密钥）时返回 `Ok(false)`
    pub async fn switch_next(&self) -> AppResult<bool> {
        let endpoint = format!("{}/switch-next", API_KEYS_ENDPOINT);
        match self.client.post_status(&endpoint).await {
            Ok(()) => Ok(true),
            Err(AppError::Api(api)) if api.is_bad_response() => {
                warn!("没有其他可用的 API 密钥: {}", api);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// 依次测试所有密钥，激活第一个可用的
    ///
    /// # 返回
    /// 全部不可用时返回 `Ok(None)`
    pub async fn test_all_and_activate_first(
        &self,
        keys: &[ApiKeyRecord],
    ) -> AppResult<Option<ApiKeyRecord>> {
        for key in keys {
            let result = self.test(&key.id).await?;
            if result.success {
                self.activate(&key.id).await?;
                info!("🔑 已激活可用密钥: {}", key.name);
                return Ok(Some(key.clone()));
            }
            warn!(
                "密钥 {} 不可用: {}",
                key.name,
                result.error.as_deref().unwrap_or("-")
            );
        }
        Ok(None)
    }
}
