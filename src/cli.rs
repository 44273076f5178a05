//! 命令行入口
//!
//! 每个子命令对应一个仪表盘操作，结果以提示行的形式打印。

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::App;
use crate::models::{
    load_videos, ItemStatus, Notice, PublishTime, ScriptFormat, ScriptOptions, ScriptTone,
    SearchParams, SortOrder, VideoDuration, YouTubeVideo,
};
use crate::utils::{
    extract_video_id, format_duration, format_korean_number, format_number, performance_badge,
    truncate_text,
};

#[derive(Parser)]
#[command(name = "tubelens")]
#[command(about = "YouTube 视频检索与爆款分析客户端", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 输出详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 按关键词搜索视频
    Search(SearchArgs),

    /// 在搜索结果中只保留 Great!! 视频
    GreatFilter,

    /// AI 内容推荐
    Analyze {
        /// 视频 ID 或 YouTube 链接
        video_id: String,
    },

    /// 提取字幕
    Transcript {
        /// 视频 ID 或 YouTube 链接
        video_id: String,

        /// 同时保存为文本文件
        #[arg(long)]
        save: bool,
    },

    /// 生成脚本
    Script(ScriptArgs),

    /// 新兴频道爆款模式分析
    Viral {
        keyword: String,

        /// 排除关键词
        #[arg(short, long)]
        exclude: Option<String>,
    },

    /// 老频道 vs 新频道对比分析
    Hybrid { keyword: String },

    /// 选中频道的爆款分析
    ChannelsViral {
        #[arg(required = true)]
        channel_ids: Vec<String>,

        /// 使用旧的频道分析接口
        #[arg(long)]
        legacy: bool,
    },

    /// 热门话题
    Trending,

    /// 已保存的脚本
    Scripts,

    /// 顺序批量分析（字幕 → 翻译 → 模式分析）
    Batch {
        /// 视频列表文件（.json / .toml），省略时使用当前选中的视频
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// 导出已完成的结果
        #[arg(long)]
        export: bool,
    },

    /// 选中视频
    Select {
        #[arg(required = true)]
        video_ids: Vec<String>,
    },

    /// 取消选中
    Unselect {
        video_ids: Vec<String>,

        /// 清空全部选择
        #[arg(long)]
        all: bool,
    },

    /// 切换单个视频的选中状态
    Toggle { video_id: String },

    /// 显示当前会话
    Status,

    /// 清空全部分析数据
    Clear,

    /// 把当前列表导出为 CSV
    ExportCsv,

    /// YouTube API 密钥管理
    Keys {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    pub keyword: String,

    #[arg(long, value_enum, default_value = "relevance")]
    pub sort: SortArg,

    #[arg(long, value_enum, default_value = "week")]
    pub period: PeriodArg,

    #[arg(long, value_enum, default_value = "any")]
    pub duration: DurationArg,

    /// 排除关键词
    #[arg(short, long)]
    pub exclude: Option<String>,
}

#[derive(Args)]
pub struct ScriptArgs {
    /// 脚本标题
    #[arg(short, long)]
    pub title: String,

    #[arg(long, value_enum, default_value = "shorts")]
    pub format: FormatArg,

    #[arg(long, value_enum, default_value = "friendly")]
    pub tone: ToneArg,

    #[arg(long)]
    pub keywords: Option<String>,

    #[arg(long)]
    pub audience: Option<String>,

    /// 同时保存为文本文件
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand)]
pub enum KeyAction {
    List,
    Add { name: String, key: String },
    Remove { id: String },
    Activate { id: String },
    Test { id: String },
    SwitchNext,
    /// 依次测试并激活第一个可用密钥
    TestAll,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    ViewCount,
    Date,
    Relevance,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Week,
    Month,
    Year,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DurationArg {
    Any,
    Short,
    Medium,
    Long,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Shorts,
    Short,
    Long,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ToneArg {
    Friendly,
    Professional,
    Casual,
    Enthusiastic,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::ViewCount => SortOrder::ViewCount,
            SortArg::Date => SortOrder::Date,
            SortArg::Relevance => SortOrder::Relevance,
        }
    }
}

impl From<PeriodArg> for PublishTime {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Week => PublishTime::Week,
            PeriodArg::Month => PublishTime::Month,
            PeriodArg::Year => PublishTime::Year,
        }
    }
}

impl From<DurationArg> for VideoDuration {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Any => VideoDuration::Any,
            DurationArg::Short => VideoDuration::Short,
            DurationArg::Medium => VideoDuration::Medium,
            DurationArg::Long => VideoDuration::Long,
        }
    }
}

impl From<FormatArg> for ScriptFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Shorts => ScriptFormat::Shorts,
            FormatArg::Short => ScriptFormat::Short,
            FormatArg::Long => ScriptFormat::Long,
        }
    }
}

impl From<ToneArg> for ScriptTone {
    fn from(arg: ToneArg) -> Self {
        match arg {
            ToneArg::Friendly => ScriptTone::Friendly,
            ToneArg::Professional => ScriptTone::Professional,
            ToneArg::Casual => ScriptTone::Casual,
            ToneArg::Enthusiastic => ScriptTone::Enthusiastic,
        }
    }
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        Self {
            keyword: args.keyword,
            sort_order: args.sort.into(),
            publish_time: args.period.into(),
            video_duration: args.duration.into(),
            exclude_keywords: args.exclude,
        }
    }
}

/// 执行一个子命令
pub async fn execute(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Search(args) => {
            print_notice(&app.search(args.into()).await);
            print_videos(&app.session().state().filtered_videos);
        }
        Commands::GreatFilter => {
            print_notice(&app.apply_great_filter().await);
            print_videos(&app.session().state().filtered_videos);
        }
        Commands::Analyze { video_id } => {
            let video = find_video(app, &resolve_video_id(&video_id));
            print_notice(&app.analyze_video(video).await);
            if let Some(analysis) = &app.session().state().ai_analysis {
                print_section("트렌드", &analysis.trends);
                print_section("타겟", &analysis.targets);
                print_section("후킹 포인트", &analysis.hooks);
                print_section("추천 제목", &analysis.suggested_titles);
            }
        }
        Commands::Transcript { video_id, save } => {
            let video_id = resolve_video_id(&video_id);
            let video = find_video(app, &video_id);
            let title = video.title.clone();
            let notice = app.extract_transcript(video).await;
            print_notice(&notice);
            if !notice.is_error() {
                if let Some(transcript) = app.session().state().extracted_transcript.clone() {
                    println!("{}", transcript);
                    if save {
                        let name = format!("{}_transcript.txt", file_stem(&title, &video_id));
                        let path = app.save_text(&name, &transcript).await?;
                        println!("💾 {}", path.display());
                    }
                }
            }
        }
        Commands::Script(args) => {
            let save = args.save;
            let options = ScriptOptions {
                format: args.format.into(),
                tone: args.tone.into(),
                keywords: args.keywords,
                audience: args.audience,
                title: args.title,
            };
            let title = options.title.clone();
            let notice = app.generate_script(options).await;
            print_notice(&notice);
            if !notice.is_error() {
                if let Some(script) = app.session().state().generated_script.clone() {
                    println!("{}", script);
                    if save {
                        let path = app
                            .save_text(&format!("{}.txt", file_stem(&title, "script")), &script)
                            .await?;
                        println!("💾 {}", path.display());
                    }
                }
            }
        }
        Commands::Viral { keyword, exclude } => {
            print_notice(&app.analyze_viral_patterns(&keyword, exclude.as_deref()).await);
            print_json(app.session().state().viral_patterns_data.as_ref());
        }
        Commands::Hybrid { keyword } => {
            print_notice(&app.hybrid_analysis(&keyword).await);
            print_json(app.session().state().hybrid_analysis_data.as_ref());
        }
        Commands::ChannelsViral {
            channel_ids,
            legacy,
        } => {
            if legacy {
                print_notice(&app.analyze_channels_viral(&channel_ids).await);
                print_json(app.session().state().viral_patterns_data.as_ref());
            } else {
                print_notice(&app.selected_channels_viral(&channel_ids).await);
                print_json(app.session().state().channel_viral_data.as_ref());
            }
        }
        Commands::Trending => {
            print_notice(&app.load_trending_topics().await);
            print_json(app.session().state().cached_trending_data.as_ref());
        }
        Commands::Scripts => match app.list_scripts().await {
            Ok(scripts) => {
                println!("저장된 대본: {}개", scripts.len());
                for script in &scripts {
                    println!(
                        "{:<8} {}",
                        json_field(script, "id"),
                        truncate_text(&json_field(script, "title"), 60)
                    );
                }
            }
            Err(notice) => print_notice(&notice),
        },
        Commands::Batch { file, export } => {
            let videos = match file {
                Some(path) => load_videos(&path)
                    .await
                    .with_context(|| format!("加载视频列表失败: {}", path.display()))?,
                None => app.selected_videos(),
            };
            run_batch(app, &videos, export).await;
        }
        Commands::Select { video_ids } => {
            for id in &video_ids {
                app.select_video(&resolve_video_id(id), true);
            }
            println!("선택된 영상: {}개", app.selected_ids().len());
        }
        Commands::Unselect { video_ids, all } => {
            if all {
                app.clear_selection();
            } else {
                for id in &video_ids {
                    app.select_video(&resolve_video_id(id), false);
                }
            }
            println!("선택된 영상: {}개", app.selected_ids().len());
        }
        Commands::Toggle { video_id } => {
            let video_id = resolve_video_id(&video_id);
            let selected = app.toggle_video(&video_id);
            println!(
                "{} {}",
                video_id,
                if selected { "선택됨" } else { "선택 해제됨" }
            );
        }
        Commands::Status => print_status(app),
        Commands::Clear => print_notice(&app.clear_all().await),
        Commands::ExportCsv => print_notice(&app.export_csv().await),
        Commands::Keys { action } => execute_key_action(app, action).await?,
    }

    Ok(())
}

async fn execute_key_action(app: &App, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::List => {
            let (keys, summary) = app
                .list_api_keys()
                .await
                .context("API 密钥列表获取失败")?;
            for key in &keys {
                let marker = if key.is_active { "*" } else { " " };
                let status = if key.quota_exceeded { "할당량 초과" } else { "사용 가능" };
                println!(
                    "{} {:<12} {:<20} {} ({})",
                    marker,
                    key.id,
                    key.name,
                    key.masked_key(),
                    status
                );
            }
            println!("사용 가능: {}/{}", summary.available, summary.total);
            if summary.all_exceeded() {
                println!("⚠️ 모든 키의 할당량이 초과되었습니다.");
            }
        }
        KeyAction::Add { name, key } => print_notice(&app.add_api_key(&name, &key).await),
        KeyAction::Remove { id } => print_notice(&app.remove_api_key(&id).await),
        KeyAction::Activate { id } => print_notice(&app.activate_api_key(&id).await),
        KeyAction::Test { id } => print_notice(&app.test_api_key(&id).await),
        KeyAction::SwitchNext => print_notice(&app.switch_next_api_key().await),
        KeyAction::TestAll => print_notice(&app.test_all_api_keys().await),
    }
    Ok(())
}

async fn run_batch(app: &App, videos: &[YouTubeVideo], export: bool) {
    let snapshot = match app.run_batch(videos).await {
        Ok(snapshot) => snapshot,
        Err(notice) => {
            print_notice(&notice);
            return;
        }
    };

    for item in &snapshot.items {
        let detail = match item.status {
            ItemStatus::Failed => item.error.clone().unwrap_or_default(),
            ItemStatus::Completed if item.translation_degraded => {
                "번역 실패, 원문으로 분석".to_string()
            }
            _ => String::new(),
        };
        println!("{:<14} {:<6} {}", item.video_id, item.status.label(), detail);
    }
    println!(
        "완료 {} / 실패 {} / 전체 {} ({}%)",
        snapshot.completed_count(),
        snapshot.failed_count(),
        snapshot.total,
        snapshot.percent()
    );

    if export {
        match app.export_batch(&snapshot, videos).await {
            Ok(path) => println!("💾 {}", path.display()),
            Err(notice) => print_notice(&notice),
        }
    }
}

/// 链接取出视频 ID，其他输入原样当作 ID
fn resolve_video_id(arg: &str) -> String {
    extract_video_id(arg).unwrap_or_else(|| arg.trim().to_string())
}

/// 在当前列表中按 ID 查找视频，找不到时只带 ID
fn find_video(app: &App, video_id: &str) -> YouTubeVideo {
    let state = app.session().state();
    state
        .filtered_videos
        .iter()
        .chain(state.search_results.iter().flat_map(|r| r.videos.iter()))
        .find(|v| v.video_id == video_id)
        .cloned()
        .unwrap_or_else(|| YouTubeVideo {
            video_id: video_id.to_string(),
            ..Default::default()
        })
}

fn file_stem(title: &str, fallback: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// 取出字段的展示文本，字符串不带引号
fn json_field(value: &serde_json::Value, name: &str) -> String {
    match value.get(name) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
}

fn print_section(title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!("\n[{}]", title);
    for line in lines {
        println!("  - {}", line);
    }
}

fn print_json(value: Option<&serde_json::Value>) {
    if let Some(value) = value {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::warn!("无法格式化结果: {}", e),
        }
    }
}

fn print_videos(videos: &[YouTubeVideo]) {
    for video in videos {
        println!(
            "{:<14} {:<8} {:>8} {:>8} {:>7} CII {:>5.1} {:>5.1}%  {}",
            video.video_id,
            performance_badge(video.performance_level),
            format_number(video.view_count),
            format_korean_number(video.subscriber_count),
            format_duration(&video.duration),
            video.cii,
            video.engagement_rate,
            truncate_text(&video.title, 50)
        );
    }
}

fn print_status(app: &App) {
    let state = app.session().state();
    println!("后端: {}", app.config().api_base_url);
    match &state.search_results {
        Some(results) => println!(
            "검색 결과: {}개 (Great {} / Good {} / 보통 {})",
            results.videos.len(),
            results.summary.great,
            results.summary.good,
            results.summary.normal
        ),
        None => println!("검색 결과: 없음"),
    }
    println!("현재 목록: {}개", state.filtered_videos.len());
    println!("선택된 영상: {}개", state.selected_videos.len());
    if let Some(video) = &state.selected_video {
        println!("선택된 영상 상세: {} ({})", video.title, video.video_id);
    }
    let flags = [
        ("AI 분석", state.ai_analysis.is_some()),
        ("대본", state.generated_script.is_some()),
        ("자막", state.extracted_transcript.is_some()),
        ("트렌드", state.cached_trending_data.is_some()),
        ("바이럴 패턴", state.viral_patterns_data.is_some()),
        ("하이브리드", state.hybrid_analysis_data.is_some()),
        ("채널 바이럴", state.channel_viral_data.is_some()),
    ];
    for (name, present) in flags {
        println!("{}: {}", name, if present { "있음" } else { "없음" });
    }
    for (name, keyword) in [
        ("바이럴 키워드", &state.viral_patterns_keyword),
        ("하이브리드 키워드", &state.hybrid_analysis_keyword),
        ("채널 바이럴 키워드", &state.channel_viral_keyword),
    ] {
        if !keyword.is_empty() {
            println!("{}: {}", name, keyword);
        }
    }
    print_videos(&state.filtered_videos);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "tubelens", "search", "캠핑", "--sort", "view-count", "--period", "month",
        ])
        .unwrap();

        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        let params: SearchParams = args.into();
        assert_eq!(params.keyword, "캠핑");
        assert_eq!(params.sort_order, SortOrder::ViewCount);
        assert_eq!(params.publish_time, PublishTime::Month);
        assert_eq!(params.video_duration, VideoDuration::Any);
    }

    #[test]
    fn test_parse_keys_and_batch() {
        let cli = Cli::try_parse_from(["tubelens", "keys", "switch-next"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Keys {
                action: KeyAction::SwitchNext
            }
        ));

        let cli =
            Cli::try_parse_from(["tubelens", "-v", "batch", "--file", "videos.toml", "--export"])
                .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Batch {
                file: Some(_),
                export: true
            }
        ));
    }

    #[test]
    fn test_resolve_video_id() {
        assert_eq!(resolve_video_id("https://youtu.be/abc123"), "abc123");
        assert_eq!(resolve_video_id(" abc123 "), "abc123");
        assert!(matches!(
            Cli::try_parse_from(["tubelens", "scripts"]).unwrap().command,
            Commands::Scripts
        ));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("My Video!! #1", "x"), "My Video 1");
        assert_eq!(file_stem("???", "script"), "script");
    }
}
