//! 会话层：仪表盘字段的内存状态与持久化镜像

pub mod keys;
pub mod store;

pub use keys::SessionKey;
pub use store::{SessionState, SessionStore};
