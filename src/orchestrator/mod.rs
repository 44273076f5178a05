//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和进度统计，是批量分析的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量视频处理器
//! - 为整批视频建立 `pending` 条目
//! - 严格顺序地逐个调用 `VideoFlow`
//! - 每个条目之后固定等待
//! - 推送进度快照
//!
//! ### `progress` - 进度快照
//! - 计数、百分比、按 ID 查询状态
//! - 导出已完成条目
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<YouTubeVideo>)
//!     ↓
//! workflow::VideoFlow (处理单个视频)
//!     ↓
//! services (能力层：transcript / translation / pattern)
//!     ↓
//! infrastructure (基础设施：ApiClient)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和统计，不做阶段判断

pub mod batch_processor;
pub mod progress;

// 重新导出主要类型
pub use batch_processor::BatchProcessor;
pub use progress::{progress_percent, BatchProgress, BatchSnapshot};
