//! 타이머 작업 모듈.
//!
//! 작업마다 주기가 있고, 주기가 돌아오면 스로틀러를 통해 키를 누른다.
//! 첫 입력은 시작 후 한 주기가 지나서 일어난다. 대기는 `check_interval`
//! 청크로 나눠 정지 신호를 확인한다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::config::{secs, AppConfig, MODULE_TIMED_TASK};
use autodoor_core::error::CoreError;
use autodoor_core::models::action::ActionRequest;
use autodoor_core::ports::module::MonitorModule;

use super::ModuleDeps;
use crate::pacing::{cooperative_sleep, deadline_after};
use crate::task_slot::{LoopGuard, TaskSlot};

/// 표시 이름
pub const LABEL: &str = "타이머 작업";

/// 주기 키 입력 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub key: String,
    pub interval: Duration,
}

/// 타이머 작업 모듈
pub struct TimedTaskModule {
    schedules: Vec<Schedule>,
    check_interval: Duration,
    throttler: Arc<ActionThrottler>,
    slot: TaskSlot,
}

impl TimedTaskModule {
    /// 새 모듈 생성
    pub fn new(schedules: Vec<Schedule>, check_interval: Duration, deps: &ModuleDeps) -> Self {
        Self {
            schedules,
            check_interval,
            throttler: deps.throttler.clone(),
            slot: TaskSlot::new(deps.run_state.clone()),
        }
    }

    /// 설정에서 생성
    pub fn build(config: &AppConfig, deps: &ModuleDeps) -> Self {
        let schedules = config
            .timed
            .tasks
            .iter()
            .map(|t| Schedule {
                key: t.key.clone(),
                interval: secs(t.interval_secs),
            })
            .collect();
        Self::new(schedules, secs(config.timed.check_interval_secs), deps)
    }
}

#[async_trait]
impl MonitorModule for TimedTaskModule {
    fn name(&self) -> &str {
        MODULE_TIMED_TASK
    }

    fn label(&self) -> &str {
        LABEL
    }

    async fn start(&self) -> Result<(), CoreError> {
        if self.schedules.is_empty() {
            return Err(CoreError::Config("타이머 작업이 없습니다".to_string()));
        }
        if self.schedules.iter().any(|s| s.interval.is_zero()) {
            return Err(CoreError::Config("작업 주기는 0보다 커야 합니다".to_string()));
        }
        let schedules = self.schedules.clone();
        let check = self.check_interval;
        let throttler = self.throttler.clone();
        if self
            .slot
            .start(move |guard| run_schedules(schedules, check, throttler, guard))
        {
            info!(module = MODULE_TIMED_TASK, tasks = self.schedules.len(), "모듈 시작");
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

async fn run_schedules(
    schedules: Vec<Schedule>,
    check_interval: Duration,
    throttler: Arc<ActionThrottler>,
    guard: LoopGuard,
) {
    let start = Instant::now();
    let mut due: Vec<Instant> = schedules
        .iter()
        .map(|s| deadline_after(start, s.interval))
        .collect();

    'outer: while guard.should_run() {
        if guard.is_paused() {
            tokio::time::sleep(check_interval).await;
            continue;
        }

        let Some(next) = due.iter().copied().min() else {
            break;
        };
        let now = Instant::now();
        if next > now {
            if !cooperative_sleep(next - now, check_interval, || guard.should_run()).await {
                break;
            }
            continue;
        }

        for (schedule, due_at) in schedules.iter().zip(due.iter_mut()) {
            if *due_at > Instant::now() {
                continue;
            }
            if !guard.should_run() {
                break 'outer;
            }
            debug!(key = %schedule.key, "타이머 작업 실행");
            throttler.dispatch(&ActionRequest::key(schedule.key.clone())).await;

            // 밀린 주기는 건너뛴다
            let now = Instant::now();
            while *due_at <= now {
                *due_at = deadline_after(*due_at, schedule.interval);
            }
        }
    }

    info!(module = MODULE_TIMED_TASK, "타이머 작업 루프 종료");
}
