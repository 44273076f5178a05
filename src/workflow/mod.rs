//! 流程层：定义"一个视频"如何经过各个阶段

pub mod item_ctx;
pub mod stages;
pub mod video_flow;

pub use item_ctx::ItemCtx;
pub use stages::{AnalysisStage, TranscriptStage, TranslationStage};
pub use video_flow::{VideoFlow, TRANSCRIPT_MISSING, UNKNOWN_ERROR};
