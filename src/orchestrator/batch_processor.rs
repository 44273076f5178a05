//! 批量视频处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：为整批输入创建全部 `pending` 的条目
//! 2. **顺序调度**：严格按输入顺序逐个处理，同一时刻只有一个条目在处理
//! 3. **节流**：每个条目结束后固定等待一段时间，无论成功失败
//! 4. **进度发布**：每次状态变化后把快照推给订阅者
//!
//! ## 设计特点
//!
//! - 不重试、不回滚、不中途取消
//! - 从不向调用方返回错误，失败写进条目本身
//! - 订阅者全部释放后停止发布，运行本身照常结束

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{ItemStatus, YouTubeVideo};
use crate::orchestrator::progress::{BatchProgress, BatchSnapshot};
use crate::services::{PatternService, TranscriptService, TranslationService};
use crate::utils::logging::{append_log_line, log_batch_start};
use crate::workflow::{AnalysisStage, ItemCtx, TranscriptStage, TranslationStage, VideoFlow};

/// 批量处理器
pub struct BatchProcessor<X = TranscriptService, T = TranslationService, A = PatternService> {
    flow: VideoFlow<X, T, A>,
    item_delay: Duration,
    log_file: Option<String>,
    tx: watch::Sender<BatchSnapshot>,
}

impl<X, T, A> BatchProcessor<X, T, A>
where
    X: TranscriptStage,
    T: TranslationStage,
    A: AnalysisStage,
{
    pub fn new(flow: VideoFlow<X, T, A>, item_delay: Duration) -> Self {
        let (tx, _) = watch::channel(BatchSnapshot::default());
        Self {
            flow,
            item_delay,
            log_file: None,
            tx,
        }
    }

    /// 每个条目结束时向运行日志文件追加一行
    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// 订阅进度
    pub fn subscribe(&self) -> BatchProgress {
        BatchProgress::new(self.tx.subscribe())
    }

    /// 处理整批视频，返回最终快照
    ///
    /// `&mut self` 保证同一个处理器不会被并发重入。
    pub async fn run(&mut self, videos: &[YouTubeVideo]) -> BatchSnapshot {
        let mut snapshot = BatchSnapshot::start(videos);
        self.publish(&snapshot);

        log_batch_start(videos.len(), self.item_delay.as_millis());

        for (index, video) in videos.iter().enumerate() {
            let ctx = ItemCtx::new(index, videos.len(), &video.video_id);

            let mut record = snapshot.items[index].clone();
            record.start();
            snapshot.current_index = Some(index);
            snapshot.items[index] = record.clone();
            self.publish(&snapshot);

            let status = self.flow.run(&mut record, video, &ctx).await;
            self.record_outcome(&ctx, status, record.error.as_deref());

            snapshot.items[index] = record;
            self.publish(&snapshot);

            info!(
                "📈 进度: {}% ({} 成功 / {} 失败 / 共 {})",
                snapshot.percent(),
                snapshot.completed_count(),
                snapshot.failed_count(),
                snapshot.total
            );

            if !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        snapshot.is_processing = false;
        self.publish(&snapshot);
        snapshot
    }

    fn publish(&self, snapshot: &BatchSnapshot) {
        if self.tx.is_closed() {
            debug!("没有进度订阅者，跳过状态推送");
            return;
        }
        self.tx.send_replace(snapshot.clone());
    }

    fn record_outcome(&self, ctx: &ItemCtx, status: ItemStatus, error: Option<&str>) {
        let Some(log_file) = &self.log_file else {
            return;
        };

        let line = match error {
            Some(reason) => format!("{} {}: {}", ctx, status, reason),
            None => format!("{} {}", ctx, status),
        };
        if let Err(e) = append_log_line(log_file, &line) {
            warn!("写入运行日志失败 ({}): {}", log_file, e);
        }
    }
}
