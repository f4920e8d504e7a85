//! 모니터링 모듈.
//!
//! - 감지 모듈 ([`DetectorModule`]): OCR 트리거, 숫자 인식, 색상 인식.
//!   시작할 때마다 새 감지기로 [`TriggerLoop`]를 만든다.
//! - [`timed_task::TimedTaskModule`]: 주기적 키 입력
//! - [`scripted_macro::ScriptedMacroModule`]: 반복 스크립트

pub mod color_recognition;
pub mod number_recognition;
pub mod ocr_trigger;
pub mod scripted_macro;
pub mod timed_task;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::config::AppConfig;
use autodoor_core::error::CoreError;
use autodoor_core::ports::frame_source::FrameSource;
use autodoor_core::ports::module::MonitorModule;
use autodoor_core::ports::recognition::RecognitionEngine;
use autodoor_core::ports::vision::TriggerDetector;
use autodoor_core::state::RunState;

use crate::registry::ModuleRegistry;
use crate::task_slot::TaskSlot;
use crate::trigger_loop::{LoopSettings, TriggerLoop};

/// 모듈 생성에 필요한 공유 의존성
#[derive(Clone)]
pub struct ModuleDeps {
    pub run_state: Arc<RunState>,
    pub source: Arc<dyn FrameSource>,
    pub engine: Arc<dyn RecognitionEngine>,
    pub throttler: Arc<ActionThrottler>,
}

/// 다섯 모듈을 모두 등록한 레지스트리
///
/// 활성 여부와 상관없이 전부 등록한다. 정지는 등록된 모든 모듈에 적용된다.
pub fn standard_registry(
    config: &AppConfig,
    deps: &ModuleDeps,
) -> Result<ModuleRegistry, CoreError> {
    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(ocr_trigger::build(config, deps)))?;
    registry.register(Arc::new(timed_task::TimedTaskModule::build(config, deps)))?;
    registry.register(Arc::new(number_recognition::build(config, deps)))?;
    registry.register(Arc::new(scripted_macro::ScriptedMacroModule::build(config, deps)))?;
    registry.register(Arc::new(color_recognition::build(config, deps)))?;
    Ok(registry)
}

type DetectorFactory = Box<dyn Fn() -> Box<dyn TriggerDetector> + Send + Sync>;

/// 감지기 기반 모듈
pub struct DetectorModule {
    name: String,
    label: String,
    settings: LoopSettings,
    source: Arc<dyn FrameSource>,
    throttler: Arc<ActionThrottler>,
    make_detector: DetectorFactory,
    slot: TaskSlot,
}

impl DetectorModule {
    /// 새 감지 모듈 생성
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        settings: LoopSettings,
        deps: &ModuleDeps,
        make_detector: DetectorFactory,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            settings,
            source: deps.source.clone(),
            throttler: deps.throttler.clone(),
            make_detector,
            slot: TaskSlot::new(deps.run_state.clone()),
        }
    }

    /// 루프 설정
    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }
}

#[async_trait]
impl MonitorModule for DetectorModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn start(&self) -> Result<(), CoreError> {
        let trigger_loop = TriggerLoop::new(
            self.name.clone(),
            self.settings,
            self.source.clone(),
            (self.make_detector)(),
            self.throttler.clone(),
        );
        if self.slot.start(|guard| trigger_loop.run(guard)) {
            info!(module = %self.name, "모듈 시작");
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), CoreError> {
        self.slot.stop();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.slot.is_running()
    }

    fn take_task(&self) -> Option<JoinHandle<()>> {
        self.slot.take_task()
    }
}
