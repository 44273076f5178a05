//! 会话状态存储
//!
//! - 构造时从持久化后端逐键加载（hydrate），缺失或损坏的键取默认值
//! - 每个字段的 setter 就是它的保存钩子：值变化时只序列化这一个字段并异步写入
//! - 同一个键的写入按调用顺序生效，较早的写入不会覆盖较晚的写入
//! - reset 清空内存并逐个删除全部保留键，单个键删除失败不影响其它键
//! - 所有持久化错误只记录 warn 日志，不向调用方传播

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::infrastructure::StorageBackend;
use crate::models::{AiAnalysis, Notice, SearchResults, YouTubeVideo};
use crate::session::keys::SessionKey;

/// 仪表盘的全部持久化字段
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub search_results: Option<SearchResults>,
    pub filtered_videos: Vec<YouTubeVideo>,
    pub selected_video: Option<YouTubeVideo>,
    pub ai_analysis: Option<AiAnalysis>,
    pub generated_script: Option<String>,
    pub extracted_transcript: Option<String>,
    pub selected_videos: BTreeSet<String>,
    pub cached_trending_data: Option<JsonValue>,
    pub viral_patterns_data: Option<JsonValue>,
    pub viral_patterns_keyword: String,
    pub hybrid_analysis_data: Option<JsonValue>,
    pub hybrid_analysis_keyword: String,
    pub channel_viral_data: Option<JsonValue>,
    pub shopping_channel_viral_data: Option<JsonValue>,
    pub title_analysis: Option<JsonValue>,
    pub thumbnail_analysis: Option<JsonValue>,
    pub popular_titles: Vec<JsonValue>,
    pub content_recommendations: Vec<JsonValue>,
    pub channel_viral_keyword: String,
}

impl SessionState {
    /// 是否有值得提示"已恢复"的数据
    pub fn has_restorable_data(&self) -> bool {
        self.search_results.is_some()
            || !self.filtered_videos.is_empty()
            || self.viral_patterns_data.is_some()
            || self.channel_viral_data.is_some()
    }
}

enum WriteOp {
    Put(String),
    Remove,
}

/// 单个键的写入序号
#[derive(Default)]
struct KeySlot {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

/// 后台写入器
struct Persister {
    backend: Arc<dyn StorageBackend>,
    slots: Vec<Arc<KeySlot>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Persister {
    fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            slots: SessionKey::ALL
                .iter()
                .map(|_| Arc::new(KeySlot::default()))
                .collect(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// 分配序号并打包成可在阻塞线程执行的任务
    fn job(&self, key: SessionKey, op: WriteOp) -> impl FnOnce() -> bool + Send + 'static {
        let slot = Arc::clone(&self.slots[key.index()]);
        let generation = slot.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let backend = Arc::clone(&self.backend);
        move || apply(backend.as_ref(), &slot, key, generation, op)
    }

    /// 不等待结果；没有运行时的时候直接同步写
    fn submit(&self, key: SessionKey, op: WriteOp) {
        let job = self.job(key, op);
        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(move || {
                    job();
                });
                if let Ok(mut pending) = self.pending.lock() {
                    pending.retain(|t| !t.is_finished());
                    pending.push(task);
                }
            }
            Err(_) => {
                job();
            }
        }
    }

    /// 执行并等待结果
    async fn run(&self, key: SessionKey, op: WriteOp) -> bool {
        let job = self.job(key, op);
        match tokio::task::spawn_blocking(job).await {
            Ok(ok) => ok,
            Err(e) => {
                warn!("⚠️ {} 持久化任务异常退出: {}", key, e);
                false
            }
        }
    }

    async fn flush(&self) {
        let tasks: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for result in join_all(tasks).await {
            if let Err(e) = result {
                warn!("⚠️ 持久化任务异常退出: {}", e);
            }
        }
    }
}

fn apply(
    backend: &dyn StorageBackend,
    slot: &KeySlot,
    key: SessionKey,
    generation: u64,
    op: WriteOp,
) -> bool {
    let mut applied = slot.applied.lock().unwrap_or_else(|p| p.into_inner());
    if generation <= *applied {
        debug!("{} 已有更新的写入，跳过第 {} 次", key, generation);
        return true;
    }
    *applied = generation;

    let result = match op {
        WriteOp::Put(value) => backend.write(key.storage_key(), &value),
        WriteOp::Remove => backend.remove(key.storage_key()),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("⚠️ 持久化 {} 失败: {}", key, e);
            false
        }
    }
}

/// 读取并解析一个键，缺失、读取失败、解析失败都返回 None
fn load<T: DeserializeOwned>(backend: &dyn StorageBackend, key: SessionKey) -> Option<T> {
    let raw = match backend.read(key.storage_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("⚠️ 读取 {} 失败，使用默认值: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(value) => value,
        Err(e) => {
            let err = StorageError::Deserialize {
                key: key.storage_key().to_string(),
                source: e,
            };
            warn!("⚠️ {}，使用默认值", err);
            None
        }
    }
}

/// 会话状态存储
pub struct SessionStore {
    state: SessionState,
    persister: Persister,
    restore_notice_pending: bool,
}

impl SessionStore {
    /// 从持久化后端加载全部字段
    pub fn hydrate(backend: Arc<dyn StorageBackend>) -> Self {
        let b = backend.as_ref();
        let state = SessionState {
            search_results: load(b, SessionKey::SearchResults),
            filtered_videos: load(b, SessionKey::FilteredVideos).unwrap_or_default(),
            selected_video: load(b, SessionKey::SelectedVideo),
            ai_analysis: load(b, SessionKey::AiAnalysis),
            generated_script: load(b, SessionKey::GeneratedScript),
            extracted_transcript: load(b, SessionKey::ExtractedTranscript),
            selected_videos: load::<Vec<String>>(b, SessionKey::SelectedVideos)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_default(),
            cached_trending_data: load(b, SessionKey::CachedTrendingData),
            viral_patterns_data: load(b, SessionKey::ViralPatternsData),
            viral_patterns_keyword: load(b, SessionKey::ViralPatternsKeyword).unwrap_or_default(),
            hybrid_analysis_data: load(b, SessionKey::HybridAnalysisData),
            hybrid_analysis_keyword: load(b, SessionKey::HybridAnalysisKeyword)
                .unwrap_or_default(),
            channel_viral_data: load(b, SessionKey::ChannelViralData),
            shopping_channel_viral_data: load(b, SessionKey::ShoppingChannelViralData),
            title_analysis: load(b, SessionKey::TitleAnalysis),
            thumbnail_analysis: load(b, SessionKey::ThumbnailAnalysis),
            popular_titles: load(b, SessionKey::PopularTitles).unwrap_or_default(),
            content_recommendations: load(b, SessionKey::ContentRecommendations)
                .unwrap_or_default(),
            channel_viral_keyword: load(b, SessionKey::ChannelViralKeyword).unwrap_or_default(),
        };

        let restore_notice_pending = state.has_restorable_data();
        if restore_notice_pending {
            info!(
                "💾 已恢复会话数据: {} 个视频",
                state.filtered_videos.len()
            );
        }

        Self {
            state,
            persister: Persister::new(backend),
            restore_notice_pending,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// "数据已恢复"提示，整个生命周期内最多返回一次
    pub fn take_restore_notice(&mut self) -> Option<Notice> {
        if !std::mem::take(&mut self.restore_notice_pending) {
            return None;
        }
        Some(Notice::info(
            "데이터 복원됨",
            "이전 검색 결과와 분석 데이터가 자동으로 복원되었습니다.",
        ))
    }

    /// 保存钩子：值有变化时更新内存并异步写入这一个键
    fn set<V, F>(&mut self, key: SessionKey, value: V, field: F)
    where
        V: Serialize + PartialEq,
        F: FnOnce(&mut SessionState) -> &mut V,
    {
        let slot = field(&mut self.state);
        if *slot == value {
            return;
        }
        *slot = value;

        match serde_json::to_string(&*slot) {
            Ok(json) => self.persister.submit(key, WriteOp::Put(json)),
            Err(e) => {
                let err = StorageError::Serialize {
                    key: key.storage_key().to_string(),
                    source: e,
                };
                warn!("⚠️ {}", err);
            }
        }
    }

    pub fn set_search_results(&mut self, value: Option<SearchResults>) {
        self.set(SessionKey::SearchResults, value, |s| &mut s.search_results);
    }

    pub fn set_filtered_videos(&mut self, value: Vec<YouTubeVideo>) {
        self.set(SessionKey::FilteredVideos, value, |s| &mut s.filtered_videos);
    }

    pub fn set_selected_video(&mut self, value: Option<YouTubeVideo>) {
        self.set(SessionKey::SelectedVideo, value, |s| &mut s.selected_video);
    }

    pub fn set_ai_analysis(&mut self, value: Option<AiAnalysis>) {
        self.set(SessionKey::AiAnalysis, value, |s| &mut s.ai_analysis);
    }

    pub fn set_generated_script(&mut self, value: Option<String>) {
        self.set(SessionKey::GeneratedScript, value, |s| &mut s.generated_script);
    }

    pub fn set_extracted_transcript(&mut self, value: Option<String>) {
        self.set(SessionKey::ExtractedTranscript, value, |s| {
            &mut s.extracted_transcript
        });
    }

    pub fn set_selected_videos(&mut self, value: BTreeSet<String>) {
        self.set(SessionKey::SelectedVideos, value, |s| &mut s.selected_videos);
    }

    pub fn set_cached_trending_data(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::CachedTrendingData, value, |s| {
            &mut s.cached_trending_data
        });
    }

    pub fn set_viral_patterns_data(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::ViralPatternsData, value, |s| {
            &mut s.viral_patterns_data
        });
    }

    pub fn set_viral_patterns_keyword(&mut self, value: impl Into<String>) {
        self.set(SessionKey::ViralPatternsKeyword, value.into(), |s| {
            &mut s.viral_patterns_keyword
        });
    }

    pub fn set_hybrid_analysis_data(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::HybridAnalysisData, value, |s| {
            &mut s.hybrid_analysis_data
        });
    }

    pub fn set_hybrid_analysis_keyword(&mut self, value: impl Into<String>) {
        self.set(SessionKey::HybridAnalysisKeyword, value.into(), |s| {
            &mut s.hybrid_analysis_keyword
        });
    }

    pub fn set_channel_viral_data(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::ChannelViralData, value, |s| {
            &mut s.channel_viral_data
        });
    }

    pub fn set_shopping_channel_viral_data(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::ShoppingChannelViralData, value, |s| {
            &mut s.shopping_channel_viral_data
        });
    }

    pub fn set_title_analysis(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::TitleAnalysis, value, |s| &mut s.title_analysis);
    }

    pub fn set_thumbnail_analysis(&mut self, value: Option<JsonValue>) {
        self.set(SessionKey::ThumbnailAnalysis, value, |s| {
            &mut s.thumbnail_analysis
        });
    }

    pub fn set_popular_titles(&mut self, value: Vec<JsonValue>) {
        self.set(SessionKey::PopularTitles, value, |s| &mut s.popular_titles);
    }

    pub fn set_content_recommendations(&mut self, value: Vec<JsonValue>) {
        self.set(SessionKey::ContentRecommendations, value, |s| {
            &mut s.content_recommendations
        });
    }

    pub fn set_channel_viral_keyword(&mut self, value: impl Into<String>) {
        self.set(SessionKey::ChannelViralKeyword, value.into(), |s| {
            &mut s.channel_viral_keyword
        });
    }

    // ========== 选择集合 ==========

    pub fn is_selected(&self, video_id: &str) -> bool {
        self.state.selected_videos.contains(video_id)
    }

    pub fn select_video(&mut self, video_id: &str) {
        self.set_video_selected(video_id, true);
    }

    pub fn unselect_video(&mut self, video_id: &str) {
        self.set_video_selected(video_id, false);
    }

    pub fn set_video_selected(&mut self, video_id: &str, selected: bool) {
        let mut next = self.state.selected_videos.clone();
        if selected {
            next.insert(video_id.to_string());
        } else {
            next.remove(video_id);
        }
        self.set_selected_videos(next);
    }

    /// 切换选择状态，返回切换后是否选中
    pub fn toggle_video(&mut self, video_id: &str) -> bool {
        let selected = !self.is_selected(video_id);
        self.set_video_selected(video_id, selected);
        selected
    }

    pub fn clear_selection(&mut self) {
        self.set_selected_videos(BTreeSet::new());
    }

    // ========== 生命周期 ==========

    /// 等待所有已提交的写入完成
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// 清空全部字段并删除全部保留键
    ///
    /// # 返回
    /// 删除失败的键数量
    pub async fn reset(&mut self) -> usize {
        self.state = SessionState::default();
        self.restore_notice_pending = false;

        let persister = &self.persister;
        let results = join_all(
            SessionKey::ALL
                .iter()
                .map(|key| persister.run(*key, WriteOp::Remove)),
        )
        .await;

        let failed = results.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            warn!("⚠️ 会话重置: {} 个键删除失败", failed);
        } else {
            info!("🧹 会话数据已全部清除");
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStorage;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    /// 在指定键上写入或删除失败，并统计写入次数
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_write: Option<&'static str>,
        fail_remove: Option<&'static str>,
        writes: AtomicUsize,
    }

    impl StorageBackend for FlakyStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_write == Some(key) {
                return Err(StorageError::Unavailable(format!("cannot write {}", key)));
            }
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_remove == Some(key) {
                return Err(StorageError::Unavailable(format!("cannot remove {}", key)));
            }
            self.inner.remove(key)
        }
    }

    fn video(id: &str) -> YouTubeVideo {
        YouTubeVideo {
            video_id: id.to_string(),
            title: format!("영상 {}", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_hydrate_from_empty_storage_equals_default() {
        let mut store = SessionStore::hydrate(Arc::new(MemoryStorage::new()));
        assert_eq!(store.state(), &SessionState::default());
        assert!(store.take_restore_notice().is_none());
    }

    #[test]
    fn test_setter_writes_inline_without_runtime() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::hydrate(backend.clone());

        store.set_viral_patterns_keyword("캠핑");

        assert_eq!(
            backend.read("tubelens_viralPatternsKeyword").unwrap().as_deref(),
            Some("\"캠핑\"")
        );
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_through_backend() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::hydrate(backend.clone());

        store.set_filtered_videos(vec![video("a"), video("b")]);
        store.select_video("a");
        store.set_generated_script(Some("대본".to_string()));
        store.set_popular_titles(vec![json!({ "title": "t" })]);
        store.flush().await;

        let mut restored = SessionStore::hydrate(backend);
        assert_eq!(restored.state(), store.state());
        assert!(restored.take_restore_notice().is_some());
    }

    #[tokio::test]
    async fn test_unchanged_value_is_not_written_again() {
        let backend = Arc::new(FlakyStorage::default());
        let mut store = SessionStore::hydrate(backend.clone());

        store.set_hybrid_analysis_keyword("요리");
        store.set_hybrid_analysis_keyword("요리");
        store.flush().await;

        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_write_wins_per_key() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::hydrate(backend.clone());

        for i in 0..20 {
            store.set_channel_viral_keyword(format!("kw{}", i));
        }
        store.flush().await;

        let restored = SessionStore::hydrate(backend);
        assert_eq!(restored.state().channel_viral_keyword, "kw19");
    }

    #[test]
    fn test_corrupt_key_is_treated_as_absent() {
        let backend = MemoryStorage::new();
        backend
            .write("tubelens_filteredVideos", "{not json")
            .unwrap();
        backend
            .write("tubelens_viralPatternsKeyword", "\"여행\"")
            .unwrap();
        backend.write("tubelens_selectedVideo", "null").unwrap();

        let store = SessionStore::hydrate(Arc::new(backend));

        assert!(store.state().filtered_videos.is_empty());
        assert!(store.state().selected_video.is_none());
        assert_eq!(store.state().viral_patterns_keyword, "여행");
    }

    #[test]
    fn test_restore_notice_is_shown_once() {
        let backend = MemoryStorage::new();
        backend
            .write("tubelens_channelViralData", r#"[{"channelId":"c1"}]"#)
            .unwrap();
        let mut store = SessionStore::hydrate(Arc::new(backend));

        let notice = store.take_restore_notice().unwrap();
        assert_eq!(notice.title, "데이터 복원됨");
        assert!(!notice.is_error());
        assert!(store.take_restore_notice().is_none());
    }

    #[test]
    fn test_empty_filtered_list_alone_does_not_trigger_notice() {
        let backend = MemoryStorage::new();
        backend.write("tubelens_filteredVideos", "[]").unwrap();
        backend.write("tubelens_generatedScript", "\"x\"").unwrap();
        let mut store = SessionStore::hydrate(Arc::new(backend));

        assert!(store.take_restore_notice().is_none());
    }

    #[test]
    fn test_selection_operations() {
        let mut store = SessionStore::hydrate(Arc::new(MemoryStorage::new()));

        store.select_video("a");
        store.select_video("b");
        store.select_video("a");
        assert_eq!(store.state().selected_videos.len(), 2);

        assert!(!store.toggle_video("a"));
        assert!(!store.is_selected("a"));
        assert!(store.toggle_video("c"));

        store.unselect_video("missing");
        store.set_video_selected("b", false);
        assert_eq!(
            store.state().selected_videos.iter().collect::<Vec<_>>(),
            vec!["c"]
        );

        store.clear_selection();
        assert!(store.state().selected_videos.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_value_and_other_keys() {
        let backend = Arc::new(FlakyStorage {
            fail_write: Some("tubelens_generatedScript"),
            ..Default::default()
        });
        let mut store = SessionStore::hydrate(backend.clone());

        store.set_generated_script(Some("대본 초안".to_string()));
        store.set_hybrid_analysis_keyword("여행");
        store.flush().await;

        assert_eq!(store.state().generated_script.as_deref(), Some("대본 초안"));
        assert_eq!(store.state().hybrid_analysis_keyword, "여행");
        assert!(!backend.inner.contains("tubelens_generatedScript"));
        assert_eq!(
            backend
                .inner
                .read("tubelens_hybridAnalysisKeyword")
                .unwrap()
                .as_deref(),
            Some("\"여행\"")
        );
        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reset_sweeps_every_key_even_when_one_fails() {
        let backend = Arc::new(FlakyStorage {
            fail_remove: Some("tubelens_titleAnalysis"),
            ..Default::default()
        });
        for key in SessionKey::ALL {
            backend.inner.write(key.storage_key(), "null").unwrap();
        }
        backend
            .inner
            .write("tubelens_searchResults", r#"{"videos":[]}"#)
            .unwrap();

        let mut store = SessionStore::hydrate(backend.clone());
        assert!(store.state().search_results.is_some());

        let failed = tokio_test::block_on(store.reset());

        assert_eq!(failed, 1);
        assert_eq!(store.state(), &SessionState::default());
        assert_eq!(backend.inner.len(), 1);
        assert!(backend.inner.contains("tubelens_titleAnalysis"));
        assert!(store.take_restore_notice().is_none());
    }

    #[tokio::test]
    async fn test_reset_then_hydrate_equals_default() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::hydrate(backend.clone());
        store.set_search_results(Some(SearchResults {
            videos: vec![video("a")],
            ..Default::default()
        }));
        store.set_cached_trending_data(Some(json!({ "topics": [] })));
        store.flush().await;

        store.reset().await;

        assert!(backend.is_empty());
        let restored = SessionStore::hydrate(backend);
        assert_eq!(restored.state(), &SessionState::default());
    }
}
