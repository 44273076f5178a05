//! 业务能力层：每个服务只包装一类后端能力，不关心流程顺序

pub mod api_key_service;
pub mod dashboard_service;
pub mod export_writer;
pub mod pattern_service;
pub mod transcript_service;
pub mod translation_service;

pub use api_key_service::ApiKeyService;
pub use dashboard_service::{ChannelViralReport, DashboardService, GeneratedScript};
pub use export_writer::ExportWriter;
pub use pattern_service::{PatternMetadata, PatternRequest, PatternService};
pub use transcript_service::TranscriptService;
pub use translation_service::TranslationService;
