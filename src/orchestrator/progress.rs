//! 批量运行进度
//!
//! `BatchSnapshot` 是某一时刻全部条目状态的拷贝，
//! `BatchProgress` 是调用方持有的订阅句柄，丢弃句柄即不再接收更新。

use serde::Serialize;
use tokio::sync::watch;

use crate::models::{export_completed, BatchItem, ExportRecord, ItemStatus, YouTubeVideo};

/// 进度百分比：`round(100 * (completed + failed) / total)`，total 为 0 时为 0
pub fn progress_percent(completed: usize, failed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed + failed) as f64 * 100.0 / total as f64).round() as u32
}

/// 某一时刻的批量运行状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    pub total: usize,
    /// 当前（或最后一个）处理的条目下标，从 0 开始
    pub current_index: Option<usize>,
    pub is_processing: bool,
    pub items: Vec<BatchItem>,
}

impl BatchSnapshot {
    /// 为整批输入创建全部 `pending` 的初始状态
    pub fn start(videos: &[YouTubeVideo]) -> Self {
        Self {
            total: videos.len(),
            current_index: None,
            is_processing: true,
            items: videos
                .iter()
                .map(|v| BatchItem::pending(v.video_id.clone()))
                .collect(),
        }
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    pub fn completed_count(&self) -> usize {
        self.count(ItemStatus::Completed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(ItemStatus::Failed)
    }

    pub fn processing_count(&self) -> usize {
        self.count(ItemStatus::Processing)
    }

    pub fn percent(&self) -> u32 {
        progress_percent(self.completed_count(), self.failed_count(), self.total)
    }

    /// 运行已结束（所有条目进入终态）
    pub fn is_finished(&self) -> bool {
        !self.is_processing && self.items.iter().all(|i| i.status.is_terminal())
    }

    /// 按视频 ID 查询状态；ID 重复时返回第一个
    pub fn status_of(&self, video_id: &str) -> Option<ItemStatus> {
        self.items
            .iter()
            .find(|i| i.video_id == video_id)
            .map(|i| i.status)
    }

    /// 导出已完成条目
    pub fn export<'a>(&'a self, videos: &'a [YouTubeVideo]) -> Vec<ExportRecord<'a>> {
        export_completed(&self.items, videos)
    }
}

/// 进度订阅句柄
pub struct BatchProgress {
    rx: watch::Receiver<BatchSnapshot>,
}

impl BatchProgress {
    pub(crate) fn new(rx: watch::Receiver<BatchSnapshot>) -> Self {
        Self { rx }
    }

    /// 最新快照
    pub fn snapshot(&self) -> BatchSnapshot {
        self.rx.borrow().clone()
    }

    /// 等待下一次更新，运行器已经释放时返回 false
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
