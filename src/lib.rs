//! # TubeLens
//!
//! YouTube 视频检索、爆款分析与批量字幕分析客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，会话层独立于流程之外：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `ApiClient` - 唯一的 HTTP 连接池，所有后端调用都经过它
//! - `StorageBackend` - 会话持久化介质（文件 / 内存）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只包装一类后端能力
//! - `TranscriptService` / `TranslationService` / `PatternService` - 批量分析的三个阶段
//! - `DashboardService` - 搜索、AI 分析、爆款分析
//! - `ApiKeyService` - YouTube API 密钥管理
//! - `ExportWriter` - 写 CSV / JSON / 文本文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个视频"的完整处理流程
//! - `ItemCtx` - 上下文封装（位置 + 视频 ID）
//! - `VideoFlow` - 流程编排（字幕 → 按需翻译 → 模式分析）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 顺序批量处理，推送进度快照
//!
//! ### 会话层（Session）
//! - `session/` - 仪表盘字段的内存状态，写入时镜像到持久化介质
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ApiClient, FileStorage, MemoryStorage, StorageBackend};
pub use models::{BatchItem, ItemStatus, Notice, YouTubeVideo};
pub use orchestrator::{BatchProcessor, BatchProgress, BatchSnapshot};
pub use session::{SessionKey, SessionState, SessionStore};
pub use workflow::{ItemCtx, VideoFlow};
