//! 基础设施层：持有稀缺资源（HTTP 连接池、持久化介质），只暴露能力

pub mod api_client;
pub mod storage;

pub use api_client::ApiClient;
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
