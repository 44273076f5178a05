pub mod formatters;
pub mod logging;
pub mod text;

pub use formatters::{format_duration, format_korean_number, format_number, performance_badge};
pub use text::{contains_hangul, extract_video_id, truncate_text};
