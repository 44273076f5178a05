//! 面向用户的提示信息
//!
//! 每个失败路径都要说明"什么失败了"（标题）和"为什么"（描述），
//! 描述优先使用服务端返回的信息，否则使用固定的兜底文案。

use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    /// 由远程调用错误生成提示，服务端没有给出信息时使用 `fallback`
    pub fn from_error(title: impl Into<String>, err: &AppError, fallback: &str) -> Self {
        let description = match err {
            AppError::Api(_) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            other => other.user_message(),
        };
        Self::error(title, description)
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.variant {
            NoticeVariant::Default => "✓",
            NoticeVariant::Destructive => "✗",
        };
        write!(f, "{} {}: {}", marker, self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ValidationError};

    #[test]
    fn test_from_error_uses_server_message_or_fallback() {
        let err = AppError::Api(ApiError::BadResponse {
            endpoint: "/api/search".into(),
            status: 500,
            message: Some("YouTube quota exceeded".into()),
        });
        let notice = Notice::from_error("검색 실패", &err, "영상 검색 중 오류가 발생했습니다.");
        assert_eq!(notice.description, "YouTube quota exceeded");
        assert!(notice.is_error());

        let err = AppError::Api(ApiError::Timeout {
            endpoint: "/api/search".into(),
        });
        let notice = Notice::from_error("검색 실패", &err, "영상 검색 중 오류가 발생했습니다.");
        assert_eq!(notice.description, "영상 검색 중 오류가 발생했습니다.");
    }

    #[test]
    fn test_validation_error_keeps_its_reason() {
        let err = AppError::from(ValidationError::NoVideoSelected);
        let notice = Notice::from_error("영상을 선택해주세요", &err, "unused");
        assert!(notice.description.contains("尚未选择视频"));
    }
}
