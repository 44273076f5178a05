//! HTTP 客户端 - 基础设施层
//!
//! 持有唯一的 reqwest Client，只暴露"调用后端 JSON 接口"的能力

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, AppResult};

/// 后端 API 客户端
///
/// 职责：
/// - 持有连接池和超时配置
/// - 把非 2xx、超时、解析失败统一映射成 `ApiError`
/// - 不认识视频 / 批量流程
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// 创建新的 API 客户端，每个请求都带有配置中的超时
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: config.api_base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// POST JSON 并反序列化响应
    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(endpoint)).json(body);
        let text = self.send(endpoint, request).await?;
        parse_body(endpoint, &text)
    }

    /// 不带请求体的 POST
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<T> {
        let request = self.client.post(self.url(endpoint));
        let text = self.send(endpoint, request).await?;
        parse_body(endpoint, &text)
    }

    /// 不带请求体的 POST，只关心是否成功
    pub async fn post_status(&self, endpoint: &str) -> AppResult<()> {
        let request = self.client.post(self.url(endpoint));
        self.send(endpoint, request).await?;
        Ok(())
    }

    /// POST JSON，只关心是否成功
    pub async fn post_json_status<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AppResult<()> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<T> {
        let request = self.client.get(self.url(endpoint));
        let text = self.send(endpoint, request).await?;
        parse_body(endpoint, &text)
    }

    pub async fn delete(&self, endpoint: &str) -> AppResult<()> {
        let request = self.client.delete(self.url(endpoint));
        self.send(endpoint, request).await?;
        Ok(())
    }

    /// 发送请求并返回响应正文
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> AppResult<String> {
        debug!("调用后端接口: {}", endpoint);

        let response = request.send().await.map_err(|e| map_transport_error(endpoint, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(endpoint, e))?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            warn!(
                "接口 {} 返回错误状态 {}: {:?}",
                endpoint,
                status.as_u16(),
                message
            );
            return Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(text)
    }
}

fn map_transport_error(endpoint: &str, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: err,
        }
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, text: &str) -> AppResult<T> {
    serde_json::from_str(text).map_err(|e| {
        ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source: e,
        }
        .into()
    })
}

/// 从错误响应正文里取出 `message` 或 `error` 字段
fn extract_error_message(body: &str) -> Option<String> {
    let value: JsonValue = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"message":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            extract_error_message(r#"{"error":"no transcript"}"#).as_deref(),
            Some("no transcript")
        );
        assert_eq!(extract_error_message(r#"{"message":""}"#), None);
        assert_eq!(extract_error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = Config {
            api_base_url: "http://localhost:5000/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/search"), "http://localhost:5000/api/search");
    }
}
