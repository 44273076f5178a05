use serde::{Deserialize, Serialize};

/// YouTube Data API 密钥记录（由后端管理）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    pub id: String,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub quota_exceeded: bool,
    #[serde(default)]
    pub last_checked: Option<String>,
}

impl ApiKeyRecord {
    /// 当前是否还能使用
    pub fn is_available(&self) -> bool {
        !self.quota_exceeded
    }

    /// 打码后的密钥，只显示前后 4 位
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

/// 密钥测试结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub quota_info: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 密钥可用性汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaSummary {
    pub total: usize,
    pub available: usize,
    pub active: Option<usize>,
}

impl QuotaSummary {
    pub fn from_keys(keys: &[ApiKeyRecord]) -> Self {
        Self {
            total: keys.len(),
            available: keys.iter().filter(|k| k.is_available()).count(),
            active: keys.iter().position(|k| k.is_active),
        }
    }

    pub fn all_exceeded(&self) -> bool {
        self.total > 0 && self.available == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, active: bool, exceeded: bool) -> ApiKeyRecord {
        ApiKeyRecord {
            id: id.into(),
            name: format!("key-{}", id),
            key: "AIzaSyA1234567890abcd".into(),
            is_active: active,
            quota_exceeded: exceeded,
            last_checked: None,
        }
    }

    #[test]
    fn test_quota_summary() {
        let keys = vec![key("1", false, true), key("2", true, false), key("3", false, false)];
        let summary = QuotaSummary::from_keys(&keys);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.available, 2);
        assert_eq!(summary.active, Some(1));
        assert!(!summary.all_exceeded());

        let summary = QuotaSummary::from_keys(&[key("1", true, true)]);
        assert!(summary.all_exceeded());
        assert!(!QuotaSummary::from_keys(&[]).all_exceeded());
    }

    #[test]
    fn test_masked_key() {
        let k = key("1", true, false);
        let masked = k.masked_key();
        assert!(masked.starts_with("AIza"));
        assert!(masked.ends_with("abcd"));
        assert_eq!(masked.chars().count(), k.key.chars().count());
        assert_eq!(
            ApiKeyRecord {
                key: "short".into(),
                ..k
            }
            .masked_key(),
            "*****"
        );
    }
}
