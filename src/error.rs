//! 错误类型
//!
//! 按来源分层：远程 API、持久化存储、文件、输入校验、配置。
//! 批量流水线和会话存储都不会把这些错误继续向上抛，而是就地吸收
//! （写入条目状态或记录 warn 日志），只有单次仪表盘操作会把错误转换成通知。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 会话存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 用户输入校验失败
    #[error("输入校验失败: {0}")]
    Validation(#[from] ValidationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 请求超时
    #[error("API请求超时 ({endpoint})")]
    Timeout { endpoint: String },
    /// 非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 响应缺少必需字段
    #[error("API返回空结果 ({endpoint}): 缺少字段 `{field}`")]
    EmptyResponse { endpoint: String, field: String },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 会话存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("序列化字段 {key} 失败: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("反序列化字段 {key} 失败: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("读写字段 {key} 失败: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("存储后端不可用: {0}")]
    Unavailable(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化文件内容失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("解析文件失败 ({path}): {message}")]
    ParseFailed { path: String, message: String },
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 输入校验错误，在发出任何远程请求之前产生
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("关键词不能为空")]
    EmptyKeyword,
    #[error("尚未选择视频")]
    NoVideoSelected,
    #[error("尚未选择频道")]
    NoChannelSelected,
    #[error("没有可用的搜索结果")]
    NoSearchResults,
    #[error("没有可导出的数据")]
    NoDataToExport,
    #[error("脚本标题不能为空")]
    EmptyScriptTitle,
    #[error("密钥名称和密钥值都不能为空")]
    EmptyApiKeyFields,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 取值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ApiError {
    /// 服务端返回的可读错误信息（如果有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::BadResponse {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// 是否为 HTTP 状态码错误
    pub fn is_bad_response(&self) -> bool {
        matches!(self, ApiError::BadResponse { .. })
    }
}

impl AppError {
    /// 面向用户的错误说明
    ///
    /// 优先使用服务端返回的 message，其次是错误本身的描述。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(api) => api
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| api.to_string()),
            other => other.to_string(),
        }
    }

    /// 服务端返回的错误信息（仅远程调用错误可能有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Api(api) => api.server_message(),
            _ => None,
        }
    }

    /// 创建"响应缺少字段"错误
    pub fn empty_response(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        AppError::Api(ApiError::EmptyResponse {
            endpoint: endpoint.into(),
            field: field.into(),
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = AppError::Api(ApiError::BadResponse {
            endpoint: "/api/search".to_string(),
            status: 403,
            message: Some("quota exceeded".to_string()),
        });
        assert_eq!(err.user_message(), "quota exceeded");
        assert_eq!(err.server_message(), Some("quota exceeded"));
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err = AppError::Api(ApiError::Timeout {
            endpoint: "/api/translate".to_string(),
        });
        assert!(err.user_message().contains("/api/translate"));
        assert!(err.server_message().is_none());

        let err = AppError::from(ValidationError::EmptyKeyword);
        assert_eq!(err.user_message(), "输入校验失败: 关键词不能为空");
    }
}
