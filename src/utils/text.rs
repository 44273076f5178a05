use regex::Regex;
use std::sync::OnceLock;

fn hangul_regex() -> &'static Regex {
    static HANGUL: OnceLock<Regex> = OnceLock::new();
    // 韩文字母、兼容字母、音节
    HANGUL.get_or_init(|| {
        Regex::new(r"[\u{1100}-\u{11FF}\u{3130}-\u{318F}\u{AC00}-\u{D7A3}]")
            .expect("hangul pattern is valid")
    })
}

/// 文本中是否至少包含一个韩文字符
///
/// 只做存在性判断，不看占比。
pub fn contains_hangul(text: &str) -> bool {
    hangul_regex().is_match(text)
}

fn video_url_regexes() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/watch\?(?:[^#]*&)?v=([^&#]+)",
            r"^(?:https?://)?(?:www\.)?youtu\.be/([^?&#/]+)",
            r"^(?:https?://)?(?:www\.)?youtube\.com/embed/([^?&#/]+)",
        ]
        .map(|p| Regex::new(p).expect("video url pattern is valid"))
    })
}

/// 从 YouTube 链接中取出视频 ID
///
/// 支持 `watch?v=`、`youtu.be/`、`embed/` 三种形式，其他输入返回 `None`。
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    video_url_regexes()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_hangul() {
        assert!(contains_hangul("안녕하세요 오늘은"));
        assert!(contains_hangul("Hello 세계"));
        // 单个兼容字母也算
        assert!(contains_hangul("ㅋㅋㅋ lol"));
        assert!(contains_hangul("\u{1100}"));

        assert!(!contains_hangul("Hello world"));
        assert!(!contains_hangul("こんにちは 你好"));
        assert!(!contains_hangul(""));
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("youtube.com/watch?feature=share&v=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/abc123?si=xyz").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(extract_video_id("abc123"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123"), None);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("안녕하세요", 2), "안녕...");
    }
}
