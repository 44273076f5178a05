//! 视频处理上下文
//!
//! 封装"我正在处理这一批中的第几个视频"这一信息

use std::fmt::Display;

/// 单个批量条目的处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 视频 ID
    pub video_id: String,

    /// 在本批中的位置（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本批视频总数
    pub total: usize,
}

impl ItemCtx {
    /// 由从 0 开始的下标创建上下文
    pub fn new(index: usize, total: usize, video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            position: index + 1,
            total,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[视频 {}/{} ID#{}]",
            self.position, self.total, self.video_id
        )
    }
}
