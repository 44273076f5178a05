//! 批量分析条目
//!
//! 每个条目的状态机：`pending → processing → {completed | failed}`，
//! 终态不再迁移。状态只由批量驱动器修改。

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::models::video::YouTubeVideo;

/// 条目状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Failed)
    }

    /// 状态机是否允许 `self → next`
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Processing)
                | (ItemStatus::Processing, ItemStatus::Completed)
                | (ItemStatus::Processing, ItemStatus::Failed)
        )
    }

    /// 界面上显示的标签
    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Pending => "대기중",
            ItemStatus::Processing => "처리중",
            ItemStatus::Completed => "완료",
            ItemStatus::Failed => "실패",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 单个批量分析条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub video_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 翻译阶段失败、退回原文时为 true
    #[serde(default)]
    pub translation_degraded: bool,
}

impl BatchItem {
    pub fn pending(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            status: ItemStatus::Pending,
            transcript: None,
            translation: None,
            analysis: None,
            error: None,
            translation_degraded: false,
        }
    }

    fn transition(&mut self, next: ItemStatus) -> bool {
        if !self.status.can_transition_to(next) {
            warn!(
                "[{}] 忽略非法状态迁移: {} → {}",
                self.video_id, self.status, next
            );
            return false;
        }
        self.status = next;
        true
    }

    /// pending → processing
    pub fn start(&mut self) -> bool {
        self.transition(ItemStatus::Processing)
    }

    /// processing → completed，同时记录全部阶段产物
    pub fn complete(
        &mut self,
        transcript: String,
        translation: String,
        analysis: String,
        translation_degraded: bool,
    ) -> bool {
        if !self.transition(ItemStatus::Completed) {
            return false;
        }
        self.transcript = Some(transcript);
        self.translation = Some(translation);
        self.analysis = Some(analysis);
        self.translation_degraded = translation_degraded;
        self.error = None;
        true
    }

    /// processing → failed
    ///
    /// 已经拿到的字幕/译文保留下来用于诊断，但不会出现在导出结果中。
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        transcript: Option<String>,
        translation: Option<String>,
        translation_degraded: bool,
    ) -> bool {
        if !self.transition(ItemStatus::Failed) {
            return false;
        }
        self.error = Some(message.into());
        self.transcript = transcript;
        self.translation = translation;
        self.translation_degraded = translation_degraded;
        self.analysis = None;
        true
    }
}

/// 导出文件中的一条记录
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord<'a> {
    pub video_id: &'a str,
    pub video: Option<&'a YouTubeVideo>,
    pub transcript: Option<&'a str>,
    pub translation: Option<&'a str>,
    pub analysis: Option<&'a str>,
}

/// 只保留已完成条目，并关联回原始视频元数据
pub fn export_completed<'a>(
    items: &'a [BatchItem],
    videos: &'a [YouTubeVideo],
) -> Vec<ExportRecord<'a>> {
    items
        .iter()
        .filter(|item| item.status == ItemStatus::Completed)
        .map(|item| ExportRecord {
            video_id: &item.video_id,
            video: videos.iter().find(|v| v.video_id == item.video_id),
            transcript: item.transcript.as_deref(),
            translation: item.translation.as_deref(),
            analysis: item.analysis.as_deref(),
        })
        .collect()
}
