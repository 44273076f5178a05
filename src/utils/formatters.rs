//! 数字、时长和表现等级的显示格式

use regex::Regex;
use std::sync::OnceLock;

use crate::models::PerformanceLevel;

/// `1234567` → `1.2M`，`1500` → `1.5K`
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// 韩文单位：`12000` → `1.2만`，`3400` → `3.4천`
pub fn format_korean_number(num: u64) -> String {
    if num >= 10_000 {
        format!("{:.1}만", num as f64 / 10_000.0)
    } else if num >= 1_000 {
        format!("{:.1}천", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
    })
}

/// ISO-8601 时长转成 `h:mm:ss` 或 `m:ss`，无法识别时原样返回
pub fn format_duration(duration: &str) -> String {
    let Some(caps) = duration_regex().captures(duration) else {
        return duration.to_string();
    };

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (part(1), part(2), part(3));

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// 表现等级徽章文字
pub fn performance_badge(level: PerformanceLevel) -> &'static str {
    match level {
        PerformanceLevel::Great => "Great!!",
        PerformanceLevel::Good => "Good",
        PerformanceLevel::Normal => "보통",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(1_234_567), "1.2M");
    }

    #[test]
    fn test_format_korean_number() {
        assert_eq!(format_korean_number(500), "500");
        assert_eq!(format_korean_number(3_400), "3.4천");
        assert_eq!(format_korean_number(12_000), "1.2만");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("PT4M13S"), "4:13");
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT45S"), "0:45");
        assert_eq!(format_duration("P1D"), "P1D");
    }

    #[test]
    fn test_performance_badge() {
        assert_eq!(performance_badge(PerformanceLevel::Great), "Great!!");
        assert_eq!(performance_badge(PerformanceLevel::Normal), "보통");
    }
}
