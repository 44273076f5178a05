//! 仪表盘控制器
//!
//! `App` 是会话状态的唯一所有者。每个仪表盘操作都按同一个顺序执行：
//! 校验输入 → 调用后端 → 成功时更新会话字段 → 返回一条提示。
//! 失败时会话状态保持不变，错误只体现在返回的 `Notice` 里。

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::infrastructure::{ApiClient, FileStorage, StorageBackend};
use crate::models::{ApiKeyRecord, Notice, QuotaSummary, ScriptOptions, SearchParams, YouTubeVideo};
use crate::orchestrator::{BatchProcessor, BatchSnapshot};
use crate::services::dashboard_service::summary_count;
use crate::services::{ApiKeyService, DashboardService, ExportWriter, TranscriptService};
use crate::session::SessionStore;
use crate::utils::logging::{init_log_file, print_final_stats};
use crate::workflow::VideoFlow;

/// 按频道分析时写入的关键词
pub const SELECTED_CHANNELS_KEYWORD: &str = "선택된 채널";

/// 仪表盘控制器
pub struct App {
    config: Config,
    client: ApiClient,
    dashboard: DashboardService,
    transcripts: TranscriptService,
    api_keys: ApiKeyService,
    exporter: ExportWriter,
    session: SessionStore,
}

impl App {
    /// 使用配置中的会话目录初始化
    pub fn initialize(config: Config) -> AppResult<Self> {
        let backend = Arc::new(FileStorage::new(config.storage_dir.clone()));
        Self::with_backend(config, backend)
    }

    /// 使用指定的持久化后端初始化
    pub fn with_backend(config: Config, backend: Arc<dyn StorageBackend>) -> AppResult<Self> {
        config.validate()?;
        let client = ApiClient::new(&config)?;

        Ok(Self {
            dashboard: DashboardService::new(client.clone()),
            transcripts: TranscriptService::new(client.clone()),
            api_keys: ApiKeyService::new(client.clone()),
            exporter: ExportWriter::new(config.export_dir.clone()),
            session: SessionStore::hydrate(backend),
            client,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 启动时的"数据已恢复"提示，只会返回一次
    pub fn take_restore_notice(&mut self) -> Option<Notice> {
        self.session.take_restore_notice()
    }

    /// 等待会话写入落盘
    pub async fn flush(&self) {
        self.session.flush().await;
    }

    // ========== 搜索与筛选 ==========

    pub async fn search(&mut self, params: SearchParams) -> Notice {
        if params.keyword.trim().is_empty() {
            return validation_notice("키워드 입력 필요", ValidationError::EmptyKeyword);
        }

        match self.dashboard.search(&params).await {
            Ok(results) => {
                let count = results.videos.len();
                info!("🔍 搜索 {:?} 找到 {} 个视频", params.keyword, count);
                self.session.set_filtered_videos(results.videos.clone());
                self.session.set_search_results(Some(results));
                Notice::info("검색 완료", format!("{}개의 영상을 찾았습니다.", count))
            }
            Err(e) => failure_notice("검색 실패", &e, "영상 검색 중 오류가 발생했습니다."),
        }
    }

    pub async fn apply_great_filter(&mut self) -> Notice {
        let videos = match &self.session.state().search_results {
            Some(results) if !results.videos.is_empty() => results.videos.clone(),
            _ => return validation_notice("필터 적용 불가", ValidationError::NoSearchResults),
        };

        match self.dashboard.filter_great(&videos).await {
            Ok(great) => {
                let count = great.len();
                self.session.set_filtered_videos(great);
                Notice::info(
                    "필터 적용 완료",
                    format!("Great!! 영상 {}개를 찾았습니다.", count),
                )
            }
            Err(e) => failure_notice(
                "필터 적용 실패",
                &e,
                "Great!! 필터 적용 중 오류가 발생했습니다.",
            ),
        }
    }

    // ========== 单个视频 ==========

    pub async fn analyze_video(&mut self, video: YouTubeVideo) -> Notice {
        let title = video.title.clone();
        let result = self.dashboard.ai_analysis(&video).await;
        match result {
            Ok(analysis) => {
                self.session.set_selected_video(Some(video));
                self.session.set_ai_analysis(Some(analysis));
                Notice::info("AI 분석 완료", format!("{} 분석이 완료되었습니다.", title))
            }
            Err(e) => failure_notice("AI 분석 실패", &e, "AI 분석 중 오류가 발생했습니다."),
        }
    }

    pub async fn generate_script(&mut self, options: ScriptOptions) -> Notice {
        if options.title.trim().is_empty() {
            return validation_notice("제목 입력 필요", ValidationError::EmptyScriptTitle);
        }

        match self.dashboard.generate_script(&options).await {
            Ok(script) => {
                self.session.set_generated_script(Some(script.content));
                Notice::info("대본 생성 완료", "AI가 맞춤형 대본을 생성했습니다.")
            }
            Err(e) => failure_notice("대본 생성 실패", &e, "대본 생성 중 오류가 발생했습니다."),
        }
    }

    pub async fn extract_transcript(&mut self, video: YouTubeVideo) -> Notice {
        match self.transcripts.extract(&video.video_id).await {
            Ok(Some(transcript)) => {
                self.session.set_selected_video(Some(video));
                self.session.set_extracted_transcript(Some(transcript));
                Notice::info("대본 추출 완료", "영상의 대본을 성공적으로 추출했습니다.")
            }
            Ok(None) => Notice::error("대본 추출 실패", "영상의 대본을 찾을 수 없습니다."),
            Err(e) => failure_notice("대본 추출 실패", &e, "대본 추출 중 오류가 발생했습니다."),
        }
    }

    // ========== 爆款分析 ==========

    pub async fn analyze_viral_patterns(
        &mut self,
        keyword: &str,
        exclude_keywords: Option<&str>,
    ) -> Notice {
        if keyword.trim().is_empty() {
            return validation_notice("키워드 입력 필요", ValidationError::EmptyKeyword);
        }

        match self
            .dashboard
            .analyze_new_channels(keyword, exclude_keywords)
            .await
        {
            Ok(data) => {
                let viral = summary_count(Some(&data), "viralVideos");
                self.session.set_viral_patterns_keyword(keyword);
                self.session.set_viral_patterns_data(Some(data));
                Notice::info(
                    "바이럴 패턴 분석 완료",
                    format!("{}개의 바이럴 콘텐츠를 발견했습니다.", viral),
                )
            }
            Err(e) => failure_notice("분석 실패", &e, "바이럴 패턴 분석 중 오류가 발생했습니다."),
        }
    }

    /// 按频道分析爆款（旧接口，结果与关键词分析共用字段）
    pub async fn analyze_channels_viral(&mut self, channel_ids: &[String]) -> Notice {
        if channel_ids.is_empty() {
            return validation_notice("채널 선택 필요", ValidationError::NoChannelSelected);
        }

        match self.dashboard.analyze_channels_viral(channel_ids).await {
            Ok(data) => {
                let viral = summary_count(Some(&data), "viralVideos");
                self.session.set_viral_patterns_data(Some(data));
                self.session
                    .set_viral_patterns_keyword(SELECTED_CHANNELS_KEYWORD);
                Notice::info(
                    "채널 바이럴 분석 완료",
                    format!("{}개의 바이럴 콘텐츠를 발견했습니다.", viral),
                )
            }
            Err(e) => failure_notice(
                "채널 분석 실패",
                &e,
                "채널 바이럴 분석 중 오류가 발생했습니다.",
            ),
        }
    }

    pub async fn hybrid_analysis(&mut self, keyword: &str) -> Notice {
        if keyword.trim().is_empty() {
            return validation_notice("키워드 입력 필요", ValidationError::EmptyKeyword);
        }

        match self.dashboard.hybrid_analysis(keyword).await {
            Ok(data) => {
                self.session.set_hybrid_analysis_keyword(keyword);
                self.session.set_hybrid_analysis_data(Some(data));
                Notice::info(
                    "하이브리드 분석 완료",
                    "기존 vs 신규 채널 비교 분석이 완료되었습니다.",
                )
            }
            Err(e) => failure_notice(
                "하이브리드 분석 실패",
                &e,
                "하이브리드 분석 중 오류가 발생했습니다.",
            ),
        }
    }

    /// 选中频道的 100万+ 爆款分析
    pub async fn selected_channels_viral(&mut self, channel_ids: &[String]) -> Notice {
        if channel_ids.is_empty() {
            return validation_notice("채널 선택 필요", ValidationError::NoChannelSelected);
        }

        match self
            .dashboard
            .analyze_selected_channels_viral(channel_ids)
            .await
        {
            Ok(report) => {
                let total = report.total_viral_videos();
                self.session.set_channel_viral_data(Some(
                    report.channel_data.unwrap_or_else(empty_array),
                ));
                self.session.set_shopping_channel_viral_data(Some(
                    report.shopping_channel_data.unwrap_or_else(empty_array),
                ));
                self.session.set_title_analysis(report.title_analysis);
                self.session.set_thumbnail_analysis(report.thumbnail_analysis);
                self.session
                    .set_popular_titles(report.popular_titles.unwrap_or_default());
                self.session.set_content_recommendations(
                    report.content_recommendations.unwrap_or_default(),
                );
                self.session
                    .set_channel_viral_keyword(SELECTED_CHANNELS_KEYWORD);
                Notice::info(
                    "100만+ 조회수 바이럴 분석 완료",
                    format!("{}개의 바이럴 영상을 발견했습니다.", total),
                )
            }
            Err(e) => failure_notice(
                "채널 바이럴 분석 실패",
                &e,
                "채널 바이럴 분석 중 오류가 발생했습니다.",
            ),
        }
    }

    /// 已保存的脚本，不写入会话
    pub async fn list_scripts(&self) -> Result<Vec<serde_json::Value>, Notice> {
        self.dashboard.list_scripts().await.map_err(|e| {
            failure_notice(
                "대본 목록 로드 실패",
                &e,
                "저장된 대본을 불러오는 중 오류가 발생했습니다.",
            )
        })
    }

    pub async fn load_trending_topics(&mut self) -> Notice {
        match self.dashboard.trending_topics().await {
            Ok(data) => {
                self.session.set_cached_trending_data(Some(data));
                Notice::info("트렌드 업데이트", "인기 주제를 불러왔습니다.")
            }
            Err(e) => failure_notice(
                "트렌드 로드 실패",
                &e,
                "인기 주제를 불러오는 중 오류가 발생했습니다.",
            ),
        }
    }

    // ========== 选择集合 ==========

    pub fn select_video(&mut self, video_id: &str, selected: bool) {
        self.session.set_video_selected(video_id, selected);
    }

    pub fn toggle_video(&mut self, video_id: &str) -> bool {
        self.session.toggle_video(video_id)
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// 当前列表中被选中的视频，保持列表顺序
    pub fn selected_videos(&self) -> Vec<YouTubeVideo> {
        let state = self.session.state();
        state
            .filtered_videos
            .iter()
            .filter(|v| state.selected_videos.contains(&v.video_id))
            .cloned()
            .collect()
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.session.state().selected_videos
    }

    // ========== 重置与导出 ==========

    /// 清空全部分析数据，筛选列表回到搜索结果
    pub async fn clear_all(&mut self) -> Notice {
        let search_results = self.session.state().search_results.clone();

        let failed = self.session.reset().await;
        if failed > 0 {
            warn!("⚠️ {} 个会话键未能删除", failed);
        }

        if let Some(results) = search_results {
            self.session.set_filtered_videos(results.videos.clone());
            self.session.set_search_results(Some(results));
        }

        Notice::info(
            "모든 데이터 초기화",
            "검색 결과와 분석 데이터가 모두 지워졌습니다.",
        )
    }

    pub async fn export_csv(&self) -> Notice {
        let videos = &self.session.state().filtered_videos;
        if videos.is_empty() {
            return Notice::error("내보낼 데이터가 없습니다", "먼저 영상을 검색해주세요.");
        }

        match self.exporter.write_videos_csv(videos).await {
            Ok(path) => {
                info!("CSV 已导出: {}", path.display());
                Notice::info("내보내기 완료", "분석 결과가 CSV 파일로 저장되었습니다.")
            }
            Err(e) => failure_notice("내보내기 실패", &e, "CSV 파일 저장 중 오류가 발생했습니다."),
        }
    }

    /// 保存字幕或脚本文本
    pub async fn save_text(&self, file_name: &str, content: &str) -> AppResult<PathBuf> {
        self.exporter.write_text(file_name, content).await
    }

    // ========== 批量分析 ==========

    /// 顺序批量分析，批量状态不写入会话
    ///
    /// 输入为空时返回校验提示。
    pub async fn run_batch(&self, videos: &[YouTubeVideo]) -> Result<BatchSnapshot, Notice> {
        if videos.is_empty() {
            return Err(validation_notice(
                "영상 선택 필요",
                ValidationError::NoVideoSelected,
            ));
        }

        if let Err(e) = init_log_file(&self.config.output_log_file) {
            warn!("⚠️ 无法初始化运行日志 {}: {}", self.config.output_log_file, e);
        }

        let mut processor = BatchProcessor::new(
            VideoFlow::from_client(&self.client),
            self.config.batch_item_delay(),
        )
        .with_log_file(self.config.output_log_file.clone());

        let mut progress = processor.subscribe();
        let reporter = tokio::spawn(async move {
            let mut last_percent = None;
            while progress.changed().await {
                let percent = progress.snapshot().percent();
                if last_percent != Some(percent) {
                    info!("⏳ 批量进度 {}%", percent);
                    last_percent = Some(percent);
                }
            }
        });

        let snapshot = processor.run(videos).await;
        drop(processor);
        if let Err(e) = reporter.await {
            warn!("⚠️ 进度任务异常退出: {}", e);
        }

        print_final_stats(&snapshot, &self.config.output_log_file);
        Ok(snapshot)
    }

    /// 导出批量分析中已完成的条目
    pub async fn export_batch(
        &self,
        snapshot: &BatchSnapshot,
        videos: &[YouTubeVideo],
    ) -> Result<PathBuf, Notice> {
        let records = snapshot.export(videos);
        if records.is_empty() {
            return Err(validation_notice(
                "내보낼 데이터가 없습니다",
                ValidationError::NoDataToExport,
            ));
        }

        self.exporter
            .write_batch_results(&records)
            .await
            .map_err(|e| {
                failure_notice(
                    "내보내기 실패",
                    &e,
                    "결과 파일 저장 중 오류가 발생했습니다.",
                )
            })
    }

    // ========== API 密钥 ==========

    pub async fn list_api_keys(&self) -> AppResult<(Vec<ApiKeyRecord>, QuotaSummary)> {
        let keys = self.api_keys.list().await?;
        let summary = QuotaSummary::from_keys(&keys);
        Ok((keys, summary))
    }

    pub async fn add_api_key(&self, name: &str, key: &str) -> Notice {
        match self.api_keys.add(name, key).await {
            Ok(()) => Notice::info("성공", "새 API 키가 추가되었습니다."),
            Err(e @ AppError::Validation(_)) => Notice::error("오류", e.user_message()),
            Err(e) => failure_notice("오류", &e, "API 키 추가에 실패했습니다."),
        }
    }

    pub async fn remove_api_key(&self, id: &str) -> Notice {
        match self.api_keys.remove(id).await {
            Ok(()) => Notice::info("성공", "API 키가 삭제되었습니다."),
            Err(e) => failure_notice("오류", &e, "API 키 삭제에 실패했습니다."),
        }
    }

    pub async fn activate_api_key(&self, id: &str) -> Notice {
        match self.api_keys.activate(id).await {
            Ok(()) => Notice::info("성공", "활성 API 키가 변경되었습니다."),
            Err(e) => failure_notice("오류", &e, "API 키 활성화에 실패했습니다."),
        }
    }

    pub async fn test_api_key(&self, id: &str) -> Notice {
        match self.api_keys.test(id).await {
            Ok(result) if result.success => Notice::info(
                "테스트 성공",
                format!(
                    "API 키가 정상 작동합니다. 남은 할당량: {}",
                    result.quota_info.as_deref().unwrap_or("확인 불가")
                ),
            ),
            Ok(result) => Notice::error(
                "테스트 실패",
                result
                    .error
                    .unwrap_or_else(|| "API 키가 작동하지 않습니다.".to_string()),
            ),
            Err(e) => failure_notice("오류", &e, "API 키 테스트에 실패했습니다."),
        }
    }

    pub async fn switch_next_api_key(&self) -> Notice {
        match self.api_keys.switch_next().await {
            Ok(true) => Notice::info("성공", "다음 사용 가능한 API 키로 전환되었습니다."),
            Ok(false) => Notice::error("알림", "사용 가능한 다른 API 키가 없습니다."),
            Err(e) => failure_notice("오류", &e, "API 키 전환에 실패했습니다."),
        }
    }

    /// 依次测试全部密钥并激活第一个可用的
    pub async fn test_all_api_keys(&self) -> Notice {
        let result = match self.api_keys.list().await {
            Ok(keys) => self.api_keys.test_all_and_activate_first(&keys).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(key)) => Notice::info(
                "API 키 활성화됨",
                format!("{}가 다시 사용 가능합니다.", key.name),
            ),
            Ok(None) => Notice::error(
                "모든 키 할당량 초과",
                "모든 YouTube API 키의 일일 할당량이 초과되었습니다.",
            ),
            Err(e) => failure_notice("테스트 실패", &e, "API 키 테스트 중 오류가 발생했습니다."),
        }
    }
}

fn empty_array() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

fn validation_notice(title: &str, err: ValidationError) -> Notice {
    let description = match err {
        ValidationError::EmptyKeyword => "분석할 키워드를 먼저 입력해주세요.",
        ValidationError::NoVideoSelected => "분석할 영상을 먼저 선택해주세요.",
        ValidationError::NoChannelSelected => "분석할 채널을 먼저 선택해주세요.",
        ValidationError::NoSearchResults | ValidationError::NoDataToExport => {
            "먼저 영상을 검색해주세요."
        }
        ValidationError::EmptyScriptTitle => "대본 제목을 입력해주세요.",
        ValidationError::EmptyApiKeyFields => "키 이름과 API 키를 모두 입력해주세요.",
    };
    warn!("⚠️ {}: {}", title, err);
    Notice::error(title, description)
}

fn failure_notice(title: &str, err: &AppError, fallback: &str) -> Notice {
    warn!("❌ {}: {}", title, err);
    Notice::from_error(title, err, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStorage;
    use crate::models::SearchResults;
    use crate::session::SessionState;

    fn offline_app() -> App {
        // 校验失败的路径不会发出请求，地址不需要可达
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        App::with_backend(config, Arc::new(MemoryStorage::new())).unwrap()
    }

    #[tokio::test]
    async fn test_validation_failures_do_not_touch_state() {
        let mut app = offline_app();

        let notice = app.search(SearchParams::trending("   ")).await;
        assert!(notice.is_error());
        assert_eq!(notice.title, "키워드 입력 필요");

        assert!(app.apply_great_filter().await.is_error());
        assert!(app.analyze_viral_patterns("", None).await.is_error());
        assert!(app.hybrid_analysis(" ").await.is_error());
        assert!(app.selected_channels_viral(&[]).await.is_error());
        assert!(app.analyze_channels_viral(&[]).await.is_error());
        assert!(app
            .generate_script(ScriptOptions::default())
            .await
            .is_error());
        assert_eq!(
            app.export_csv().await.title,
            "내보낼 데이터가 없습니다"
        );
        assert!(app.run_batch(&[]).await.is_err());

        assert_eq!(app.session().state(), &SessionState::default());
    }

    #[tokio::test]
    async fn test_clear_all_keeps_search_results_as_filtered_list() {
        let mut app = offline_app();
        let videos = vec![YouTubeVideo {
            video_id: "a".into(),
            ..Default::default()
        }];
        app.session.set_search_results(Some(SearchResults {
            videos: videos.clone(),
            ..Default::default()
        }));
        app.session.set_filtered_videos(Vec::new());
        app.session.set_generated_script(Some("script".into()));
        app.select_video("a", true);

        let notice = app.clear_all().await;

        assert!(!notice.is_error());
        let state = app.session().state();
        assert_eq!(state.filtered_videos, videos);
        assert!(state.generated_script.is_none());
        assert!(state.selected_videos.is_empty());
    }

    #[tokio::test]
    async fn test_selected_videos_follow_list_order() {
        let mut app = offline_app();
        let videos: Vec<YouTubeVideo> = ["a", "b", "c"]
            .iter()
            .map(|id| YouTubeVideo {
                video_id: id.to_string(),
                ..Default::default()
            })
            .collect();
        app.session.set_filtered_videos(videos);
        app.select_video("c", true);
        app.select_video("a", true);
        app.toggle_video("b");
        app.toggle_video("b");

        let ids: Vec<String> = app
            .selected_videos()
            .into_iter()
            .map(|v| v.video_id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        app.clear_selection();
        assert!(app.selected_ids().is_empty());
    }
}
