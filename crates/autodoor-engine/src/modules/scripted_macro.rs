//! 스크립트 매크로 모듈.
//!
//! 클릭/키/대기 단계를 순서대로 반복 실행한다. 클릭과 키는 스로틀러를
//! 거치고, 대기와 회차 사이 지연은 협조적 대기로 처리한다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::config::{secs, AppConfig, MacroStep, MODULE_SCRIPTED_MACRO};
use autodoor_core::error::CoreError;
use autodoor_core::models::action::ActionRequest;
use autodoor_core::models::region::Position;
use autodoor_core::ports::module::MonitorModule;
use autodoor_core::state::AtomicCell;

use super::ModuleDeps;
use crate::pacing::cooperative_sleep;
use crate::task_slot::{LoopGuard, TaskSlot};

/// 표시 이름
pub const LABEL: &str = "스크립트 매크로";

/// 스크립트 매크로 모듈
pub struct ScriptedMacroModule {
    steps: Arc<[MacroStep]>,
    repeat_delay: Duration,
    check_interval: Duration,
    throttler: Arc<ActionThrottler>,
    rounds: Arc<AtomicCell<u64>>,
    slot: TaskSlot,
}

impl ScriptedMacroModule {
    /// 새 모듈 생성
    pub fn new(
        steps: Vec<MacroStep>,
        repeat_delay: Duration,
        check_interval: Duration,
        deps: &ModuleDeps,
    ) -> Self {
        Self {
            steps: steps.into(),
            repeat_delay,
            check_interval,
            throttler: deps.throttler.clone(),
            rounds: Arc::new(AtomicCell::new(0)),
            slot: TaskSlot::new(deps.run_state.clone()),
        }
    }

    /// 설정에서 생성
    pub fn build(config: &AppConfig, deps: &ModuleDeps) -> Self {
        let script = &config.script;
        Self::new(
            script.steps.clone(),
            secs(script.repeat_delay_secs),
            secs(script.check_interval_secs),
            deps,
        )
    }

    /// 끝까지 실행한 회차 수
    pub fn completed_rounds(&self) -> u64 {
        self.rounds.get()
    }
}

#[async_trait]
impl MonitorModule for ScriptedMacroModule {
    fn name(&self) -> &str {
        MODULE_SCRIPTED_MACRO
    }

    fn label(&self) -> &str {
        LABEL
    }

    async fn start(&self) -> Result<(), CoreError> {
        if self.steps.is_empty() {
            return Err(CoreError::Config("매크로 단계가 없습니다".to_string()));
        }
        let runner = MacroRunner {
            steps: self.steps.clone(),
            repeat_delay: self.repeat_delay,
            check_interval: self.check_interval,
            throttler: self.throttler.clone(),
            rounds: self.rounds.clone(),
        };
        if self.slot.start(move |guard| runner.run(guard)) {
            info!(module = MODULE_SCRIPTED_MACRO, steps = self.steps.len(), "모듈 시작");
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

struct MacroRunner {
    steps: Arc<[MacroStep]>,
    repeat_delay: Duration,
    check_interval: Duration,
    throttler: Arc<ActionThrottler>,
    rounds: Arc<AtomicCell<u64>>,
}

impl MacroRunner {
    async fn run(self, guard: LoopGuard) {
        while self.run_round(&guard).await {
            let round = self.rounds.increment(1);
            debug!(round, "매크로 회차 완료");
            if !cooperative_sleep(self.repeat_delay, self.check_interval, || guard.should_run())
                .await
            {
                break;
            }
        }
        info!(module = MODULE_SCRIPTED_MACRO, "매크로 루프 종료");
    }

    /// 한 회차 실행. 정지 신호를 받으면 `false`.
    async fn run_round(&self, guard: &LoopGuard) -> bool {
        for step in self.steps.iter() {
            while guard.is_paused() {
                if !guard.should_run() {
                    return false;
                }
                tokio::time::sleep(self.check_interval).await;
            }
            if !guard.should_run() {
                return false;
            }

            match step {
                MacroStep::Click { x, y } => {
                    self.throttler
                        .dispatch(&ActionRequest::click(Position::new(*x, *y), None))
                        .await;
                }
                MacroStep::Key { key } => {
                    self.throttler.dispatch(&ActionRequest::key(key.clone())).await;
                }
                MacroStep::Wait { secs: wait } => {
                    if !cooperative_sleep(secs(*wait), self.check_interval, || guard.should_run())
                        .await
                    {
                        return false;
                    }
                }
            }
        }
        true
    }
}
