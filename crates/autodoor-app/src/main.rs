//! # autodoor-app
//!
//! AUTODOOR 실행 파일 진입점.
//! DI 컨테이너 역할, 명령 콘솔, 라이프사이클 관리.

mod console;
mod lifecycle;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autodoor_automation::input_driver::create_platform_injector;
use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::config::MODULE_NAMES;
use autodoor_core::config_manager::ConfigManager;
use autodoor_core::ports::input_injector::InputInjector;
use autodoor_core::state::RunState;
use autodoor_engine::control_panel::ControlPanel;
use autodoor_engine::modules::{standard_registry, ModuleDeps};
use autodoor_engine::orchestrator::Orchestrator;
use autodoor_vision::capture::ScreenCapture;
use autodoor_vision::tesseract::TesseractEngine;

use crate::console::Console;
use crate::lifecycle::Lifecycle;

/// AUTODOOR 화면 트리거 자동화
///
/// 화면 영역을 주기적으로 인식해 조건이 맞으면 클릭/키 입력을 보낸다.
#[derive(Parser, Debug)]
#[command(name = "autodoor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 활성 모듈 지정 (쉼표 구분, 이번 실행에만 적용)
    #[arg(long, short = 'm', value_delimiter = ',')]
    modules: Option<Vec<String>>,

    /// 입력을 실제로 보내지 않고 로그만 남김
    #[arg(long)]
    dry_run: bool,

    /// 실행 직후 활성 모듈 시작
    #[arg(long)]
    autostart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "autodoor={lvl},autodoor_app={lvl},autodoor_core={lvl},autodoor_vision={lvl},autodoor_automation={lvl},autodoor_engine={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("AUTODOOR 시작");

    // ── 설정 ──
    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .map_err(|e| anyhow!("설정 로드 실패: {e}"))?;
    info!("설정 파일: {}", config_manager.config_path().display());

    let mut config = config_manager.get();
    if let Some(modules) = &args.modules {
        config.enabled_modules = modules.clone();
        config
            .validate()
            .map_err(|e| anyhow!("--modules 값이 잘못됨: {e}"))?;
    }

    // ── 어댑터 생성 (DI 와이어링) ──
    let panel = Arc::new(ControlPanel::standard(MODULE_NAMES));

    let injector: Arc<dyn InputInjector> = Arc::from(create_platform_injector(args.dry_run));
    info!(platform = injector.platform(), dry_run = args.dry_run, "입력 주입기");

    let throttler = Arc::new(
        ActionThrottler::new(injector, config.operation_interval()).with_status_sink(panel.clone()),
    );

    let engine = TesseractEngine::from_config(&config.recognition);
    info!(
        binary = %config.recognition.binary_path.display(),
        language = %config.recognition.language,
        "인식 엔진"
    );

    let deps = ModuleDeps {
        run_state: Arc::new(RunState::new()),
        source: Arc::new(ScreenCapture::new()),
        engine: Arc::new(engine),
        throttler,
    };

    let registry = standard_registry(&config, &deps)?;
    let orchestrator = Arc::new(
        Orchestrator::new(
            registry,
            deps.run_state.clone(),
            panel.clone(),
            ControlPanel::default_protected(),
            config.join_timeout(),
        )
        .with_enabled(&config.enabled_modules)?,
    );

    info!(
        modules = ?orchestrator.enabled_modules(),
        start_hotkey = %config.start_hotkey,
        stop_hotkey = %config.stop_hotkey,
        "준비 완료 (help로 명령 목록 확인)"
    );

    // ── 라이프사이클 ──
    let lifecycle = Arc::new(Lifecycle::new(orchestrator.clone()));
    lifecycle.spawn_signal_listener();

    if args.autostart {
        match orchestrator.start_all().await {
            Ok(report) => info!(started = ?report.started, "자동 시작"),
            Err(e) => warn!("자동 시작 실패: {e}"),
        }
    }

    let console = Console::new(orchestrator.clone(), panel.clone(), config_manager);
    console.run(lifecycle.subscribe()).await;

    // 리소스 해제 전 반드시 정지
    lifecycle.finish().await;

    info!("AUTODOOR 종료");
    Ok(())
}
