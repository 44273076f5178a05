pub mod api_key;
pub mod batch;
pub mod loaders;
pub mod notice;
pub mod video;

pub use api_key::{ApiKeyRecord, KeyTestResult, QuotaSummary};
pub use batch::{export_completed, BatchItem, ExportRecord, ItemStatus};
pub use loaders::load_videos;
pub use notice::{Notice, NoticeVariant};
pub use video::{
    AiAnalysis, PerformanceLevel, PublishTime, ScriptFormat, ScriptOptions, ScriptTone,
    SearchParams, SearchResults, SearchSummary, SortOrder, VideoDuration, YouTubeVideo,
};
