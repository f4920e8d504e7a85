//! 모듈 라이프사이클 오케스트레이터.
//!
//! 활성화된 모듈을 한 번에 시작하고, 등록된 모든 모듈을 한 번에 정지한다.
//! 사용자 입장에서는 하나의 원자적 동작이며, 일부 모듈이 정지에 실패해도
//! 인디케이터와 컨트롤 상태는 일관되게 남는다.
//!
//! 정지 흐름:
//! 1. 공유 실행 플래그 해제
//! 2. 모든 모듈 `stop` 호출 (오류는 기록만)
//! 3. 모든 작업 핸들을 동시에 조인 (타임아웃 하나로 전체 대기 제한)
//! 4. 인디케이터 비활성, 컨트롤 재활성, 정지 큐

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use autodoor_core::error::CoreError;
use autodoor_core::ports::control_surface::{
    ControlSurface, Cue, IndicatorState, ProtectedControls, StatusSink,
};
use autodoor_core::ports::module::MonitorModule;
use autodoor_core::state::{AtomicCell, RunState};

use crate::registry::ModuleRegistry;

/// 시작 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    /// 시작한 모듈
    pub started: Vec<String>,
    /// 시작 실패 (모듈, 사유)
    pub failed: Vec<(String, String)>,
    /// 이미 실행 중이라 아무것도 하지 않았는지
    pub already_running: bool,
}

/// 정지 결과. 정지는 실패하지 않으며, 문제는 여기에 기록된다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    /// `stop` 호출이 성공한 모듈
    pub stopped: Vec<String>,
    /// `stop` 오류 (모듈, 사유)
    pub stop_errors: Vec<(String, String)>,
    /// 조인 타임아웃으로 중단시킨 작업
    pub join_timeouts: Vec<String>,
    /// 패닉으로 끝난 작업
    pub panicked: Vec<String>,
}

impl StopReport {
    /// 문제 없이 정지했는지
    pub fn is_clean(&self) -> bool {
        self.stop_errors.is_empty() && self.join_timeouts.is_empty() && self.panicked.is_empty()
    }
}

/// 모듈 상태 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub name: String,
    pub label: String,
    pub enabled: bool,
    pub running: bool,
}

enum JoinOutcome {
    Finished,
    Panicked,
    TimedOut,
}

/// 모듈 라이프사이클 오케스트레이터
pub struct Orchestrator {
    registry: ModuleRegistry,
    enabled: RwLock<BTreeSet<String>>,
    run_state: Arc<RunState>,
    is_running: AtomicCell<bool>,
    surface: Arc<dyn ControlSurface>,
    protected: ProtectedControls,
    join_timeout: Duration,
    /// start_all / stop_all 직렬화
    control_lock: Mutex<()>,
}

impl Orchestrator {
    /// 새 오케스트레이터 생성
    pub fn new(
        registry: ModuleRegistry,
        run_state: Arc<RunState>,
        surface: Arc<dyn ControlSurface>,
        protected: ProtectedControls,
        join_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            enabled: RwLock::new(BTreeSet::new()),
            run_state,
            is_running: AtomicCell::new(false),
            surface,
            protected,
            join_timeout,
            control_lock: Mutex::new(()),
        }
    }

    /// 활성 모듈 집합 지정. 등록되지 않은 이름이 있으면 아무것도 바꾸지 않는다.
    pub fn with_enabled<I, S>(self, names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            self.ensure_registered(name)?;
            set.insert(name.to_string());
        }
        *self.enabled.write() = set;
        Ok(self)
    }

    /// 모듈 활성/비활성. 실행 중 변경은 다음 시작부터 적용된다.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), CoreError> {
        self.ensure_registered(name)?;
        let mut set = self.enabled.write();
        if enabled {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
        Ok(())
    }

    /// 활성 모듈 (등록 순서)
    pub fn enabled_modules(&self) -> Vec<String> {
        let set = self.enabled.read();
        self.registry
            .iter()
            .filter(|m| set.contains(m.name()))
            .map(|m| m.name().to_string())
            .collect()
    }

    /// 일괄 실행 중인지
    pub fn is_running(&self) -> bool {
        self.is_running.get()
    }

    /// 일시정지 중인지
    pub fn is_paused(&self) -> bool {
        self.run_state.is_paused()
    }

    /// 일시정지 전환. 이전 값 반환.
    pub fn set_paused(&self, paused: bool) -> bool {
        let previous = self.run_state.set_paused(paused);
        if previous != paused {
            info!(paused, "일시정지 상태 변경");
            self.surface
                .publish_status(if paused { "일시정지" } else { "재개" });
        }
        previous
    }

    /// 공유 실행 상태
    pub fn run_state(&self) -> &Arc<RunState> {
        &self.run_state
    }

    /// 레지스트리
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// 모듈별 상태
    pub fn status(&self) -> Vec<ModuleStatus> {
        let set = self.enabled.read();
        self.registry
            .iter()
            .map(|m| ModuleStatus {
                name: m.name().to_string(),
                label: m.label().to_string(),
                enabled: set.contains(m.name()),
                running: m.is_running(),
            })
            .collect()
    }

    /// 활성 모듈 일괄 시작.
    ///
    /// 이미 실행 중이면 아무것도 하지 않는다. 활성 모듈이 없거나 전부
    /// 시작에 실패하면 실행 상태를 되돌리고 `Lifecycle` 에러.
    pub async fn start_all(&self) -> Result<StartReport, CoreError> {
        let _guard = self.control_lock.lock().await;

        if self.is_running.get() {
            info!("이미 실행 중, 시작 요청 무시");
            return Ok(StartReport {
                already_running: true,
                ..StartReport::default()
            });
        }

        let enabled: BTreeSet<String> = self.enabled.read().clone();
        if enabled.is_empty() {
            warn!("활성화된 모듈 없음");
            self.surface.publish_status("활성화된 모듈이 없습니다");
            return Err(CoreError::Lifecycle {
                module: "*".to_string(),
                message: "활성화된 모듈이 없습니다".to_string(),
            });
        }

        // 루프가 첫 반복에서 플래그를 보므로 모듈 시작 전에 켠다
        self.run_state.set_running(true);

        let mut report = StartReport::default();
        for module in self.registry.iter().filter(|m| enabled.contains(m.name())) {
            match module.start().await {
                Ok(()) => {
                    self.surface.set_indicator(module.name(), IndicatorState::Active);
                    report.started.push(module.name().to_string());
                }
                Err(e) => {
                    error!(module = module.name(), "모듈 시작 실패: {e}");
                    self.surface
                        .publish_status(&format!("{} 시작 실패: {e}", module.label()));
                    report.failed.push((module.name().to_string(), e.to_string()));
                }
            }
        }

        if report.started.is_empty() {
            self.run_state.set_running(false);
            let names = report
                .failed
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CoreError::Lifecycle {
                module: names,
                message: "시작된 모듈이 없습니다".to_string(),
            });
        }

        self.surface.set_controls_enabled(false, &self.protected);
        self.is_running.set(true);
        self.surface.play_cue(Cue::Start);
        self.surface
            .publish_status(&format!("{}개 모듈 실행 중", report.started.len()));
        info!(started = ?report.started, failed = report.failed.len(), "일괄 시작 완료");
        Ok(report)
    }

    /// 등록된 모든 모듈 일괄 정지. 멱등이며 실패하지 않는다.
    pub async fn stop_all(&self) -> StopReport {
        let _guard = self.control_lock.lock().await;
        let was_running = self.is_running.get();

        self.run_state.set_running(false);

        let mut report = StopReport::default();
        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::new();

        for module in self.registry.iter() {
            let name = module.name().to_string();
            match module.stop().await {
                Ok(()) => report.stopped.push(name.clone()),
                Err(e) => {
                    warn!(module = %name, "모듈 정지 오류 (계속 진행): {e}");
                    report.stop_errors.push((name.clone(), e.to_string()));
                }
            }
            if let Some(handle) = module.take_task() {
                handles.push((name, handle));
            }
        }

        let timeout = self.join_timeout;
        let outcomes = join_all(handles.into_iter().map(|(name, mut handle)| async move {
            let outcome = match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(())) => JoinOutcome::Finished,
                Ok(Err(e)) if e.is_panic() => JoinOutcome::Panicked,
                Ok(Err(_)) => JoinOutcome::Finished,
                Err(_) => {
                    handle.abort();
                    JoinOutcome::TimedOut
                }
            };
            (name, outcome)
        }))
        .await;

        for (name, outcome) in outcomes {
            match outcome {
                JoinOutcome::Finished => {}
                JoinOutcome::Panicked => {
                    error!(module = %name, "모듈 작업 패닉");
                    report.panicked.push(name);
                }
                JoinOutcome::TimedOut => {
                    warn!(
                        module = %name,
                        timeout_ms = timeout.as_millis() as u64,
                        "모듈 작업 조인 타임아웃"
                    );
                    report.join_timeouts.push(name);
                }
            }
        }

        for module in self.registry.iter() {
            self.surface.set_indicator(module.name(), IndicatorState::Inactive);
        }
        self.surface.set_controls_enabled(true, &self.protected);
        self.is_running.set(false);
        self.run_state.set_paused(false);
        self.surface.play_cue(Cue::Stop);
        self.surface.publish_status("정지 완료");

        info!(
            was_running,
            stop_errors = report.stop_errors.len(),
            join_timeouts = report.join_timeouts.len(),
            panicked = report.panicked.len(),
            "일괄 정지 완료"
        );
        report
    }

    fn ensure_registered(&self, name: &str) -> Result<(), CoreError> {
        if self.registry.get(name).is_some() {
            Ok(())
        } else {
            Err(CoreError::validation(
                "enabled_modules",
                format!("등록되지 않은 모듈: {name}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::control_panel::{ControlPanel, START_BUTTON};
    use crate::task_slot::TaskSlot;

    #[derive(Clone, Copy, Default)]
    struct Behavior {
        fail_start: bool,
        fail_stop: bool,
        /// 정지 신호를 무시하는 작업
        stubborn: bool,
        panics: bool,
    }

    struct FakeModule {
        name: &'static str,
        behavior: Behavior,
        starts: AtomicCell<u32>,
        slot: TaskSlot,
    }

    impl FakeModule {
        fn new(name: &'static str, run_state: &Arc<RunState>, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                starts: AtomicCell::new(0),
                slot: TaskSlot::new(run_state.clone()),
            })
        }
    }

    #[async_trait]
    impl MonitorModule for FakeModule {
        fn name(&self) -> &str {
            self.name
        }

        fn label(&self) -> &str {
            self.name
        }

        async fn start(&self) -> Result<(), CoreError> {
            if self.behavior.fail_start {
                return Err(CoreError::Internal("boom".into()));
            }
            let behavior = self.behavior;
            let spawned = self.slot.start(move |guard| async move {
                if behavior.panics {
                    panic!("task panic");
                }
                loop {
                    if !behavior.stubborn && !guard.should_run() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            });
            if spawned {
                self.starts.increment(1);
            }
            Ok(())
        }

        async fn stop(&self) -> Result<(), CoreError> {
            self.slot.stop();
            if self.behavior.fail_stop {
                return Err(CoreError::Internal("stop failed".into()));
            }
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.slot.is_running()
        }

        fn take_task(&self) -> Option<JoinHandle<()>> {
            self.slot.take_task()
        }
    }

    struct Fixture {
        orchestrator: Orchestrator,
        panel: Arc<ControlPanel>,
        modules: Vec<Arc<FakeModule>>,
    }

    fn fixture(specs: &[(&'static str, Behavior)]) -> Fixture {
        let run_state = Arc::new(RunState::new());
        let mut registry = ModuleRegistry::new();
        let mut modules = Vec::new();
        for (name, behavior) in specs {
            let module = FakeModule::new(*name, &run_state, *behavior);
            registry.register(module.clone()).unwrap();
            modules.push(module);
        }
        let panel = Arc::new(ControlPanel::standard(specs.iter().map(|(n, _)| *n)));
        let orchestrator = Orchestrator::new(
            registry,
            run_state,
            panel.clone(),
            ControlPanel::default_protected(),
            Duration::from_secs(2),
        )
        .with_enabled(specs.iter().map(|(n, _)| *n))
        .unwrap();
        Fixture {
            orchestrator,
            panel,
            modules,
        }
    }

    #[tokio::test]
    async fn stop_all_with_nothing_running() {
        let f = fixture(&[("a", Behavior::default()), ("b", Behavior::default())]);
        let report = f.orchestrator.stop_all().await;
        assert!(report.is_clean());
        assert_eq!(report.stopped, vec!["a", "b"]);
        assert_eq!(f.panel.indicator("a"), IndicatorState::Inactive);
        assert_eq!(f.panel.indicator("b"), IndicatorState::Inactive);
        assert_eq!(f.panel.last_cue(), Some(Cue::Stop));
        assert!(!f.orchestrator.is_running());

        // 멱등
        assert!(f.orchestrator.stop_all().await.is_clean());
    }

    #[tokio::test(start_paused = true)]
    async fn start_all_activates_and_locks_controls() {
        let f = fixture(&[("a", Behavior::default()), ("b", Behavior::default())]);
        let report = f.orchestrator.start_all().await.unwrap();
        assert_eq!(report.started, vec!["a", "b"]);
        assert!(f.orchestrator.is_running());
        assert!(f.orchestrator.run_state().is_running());
        assert_eq!(f.panel.indicator("a"), IndicatorState::Active);
        assert_eq!(f.panel.is_enabled("region.x"), Some(false));
        assert_eq!(f.panel.is_enabled(START_BUTTON), Some(true));
        assert_eq!(f.panel.last_cue(), Some(Cue::Start));

        f.orchestrator.stop_all().await;
        assert_eq!(f.panel.is_enabled("region.x"), Some(true));
        assert_eq!(f.panel.indicator("a"), IndicatorState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_does_not_duplicate_tasks() {
        let f = fixture(&[("a", Behavior::default())]);
        f.orchestrator.start_all().await.unwrap();
        let again = f.orchestrator.start_all().await.unwrap();
        assert!(again.already_running);
        // 모듈 단위 재시작도 작업을 늘리지 않는다
        f.modules[0].start().await.unwrap();
        assert_eq!(f.modules[0].starts.get(), 1);
        f.orchestrator.stop_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_errors_do_not_block_other_modules() {
        let f = fixture(&[
            (
                "bad",
                Behavior {
                    fail_stop: true,
                    ..Behavior::default()
                },
            ),
            ("good", Behavior::default()),
        ]);
        f.orchestrator.start_all().await.unwrap();
        let report = f.orchestrator.stop_all().await;

        assert_eq!(report.stop_errors.len(), 1);
        assert_eq!(report.stop_errors[0].0, "bad");
        assert_eq!(report.stopped, vec!["good"]);
        assert!(!f.modules[1].is_running());
        assert!(!f.orchestrator.is_running());
        assert_eq!(f.panel.indicator("bad"), IndicatorState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_tasks_are_bounded_by_one_timeout() {
        let stubborn = Behavior {
            stubborn: true,
            ..Behavior::default()
        };
        let f = fixture(&[("x", stubborn), ("y", stubborn), ("z", Behavior::default())]);
        f.orchestrator.start_all().await.unwrap();

        let started = Instant::now();
        let report = f.orchestrator.stop_all().await;
        let waited = started.elapsed();

        assert_eq!(report.join_timeouts, vec!["x", "y"]);
        assert!(waited >= Duration::from_secs(2));
        assert!(waited < Duration::from_secs(3));
        assert!(!f.orchestrator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn task_panic_is_reported() {
        let f = fixture(&[(
            "p",
            Behavior {
                panics: true,
                ..Behavior::default()
            },
        )]);
        f.orchestrator.start_all().await.unwrap();
        tokio::task::yield_now().await;
        let report = f.orchestrator.stop_all().await;
        assert_eq!(report.panicked, vec!["p"]);
    }

    #[tokio::test]
    async fn no_enabled_modules_is_an_error() {
        let f = fixture(&[("a", Behavior::default())]);
        f.orchestrator.set_enabled("a", false).unwrap();
        assert!(f.orchestrator.start_all().await.is_err());
        assert!(!f.orchestrator.is_running());
        assert!(f.orchestrator.set_enabled("ghost", true).is_err());
    }

    #[tokio::test]
    async fn all_failed_starts_roll_back() {
        let f = fixture(&[(
            "a",
            Behavior {
                fail_start: true,
                ..Behavior::default()
            },
        )]);
        let err = f.orchestrator.start_all().await.unwrap_err();
        assert!(matches!(err, CoreError::Lifecycle { .. }));
        assert!(!f.orchestrator.is_running());
        assert!(!f.orchestrator.run_state().is_running());
        assert_eq!(f.panel.is_enabled("region.x"), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_start_failure_keeps_others_running() {
        let f = fixture(&[
            (
                "a",
                Behavior {
                    fail_start: true,
                    ..Behavior::default()
                },
            ),
            ("b", Behavior::default()),
        ]);
        let report = f.orchestrator.start_all().await.unwrap();
        assert_eq!(report.started, vec!["b"]);
        assert_eq!(report.failed[0].0, "a");
        assert_eq!(f.panel.indicator("a"), IndicatorState::Inactive);
        assert_eq!(f.panel.indicator("b"), IndicatorState::Active);
        f.orchestrator.stop_all().await;
    }

    #[tokio::test]
    async fn pause_toggles_run_state_and_resets_on_stop() {
        let f = fixture(&[("a", Behavior::default())]);
        assert!(!f.orchestrator.set_paused(true));
        assert!(f.orchestrator.is_paused());
        assert_eq!(f.panel.latest_status().as_deref(), Some("일시정지"));
        f.orchestrator.stop_all().await;
        assert!(!f.orchestrator.is_paused());
    }

    #[tokio::test]
    async fn status_lists_modules_in_registration_order() {
        let f = fixture(&[("b", Behavior::default()), ("a", Behavior::default())]);
        f.orchestrator.set_enabled("a", false).unwrap();
        let status = f.orchestrator.status();
        assert_eq!(status[0].name, "b");
        assert!(status[0].enabled);
        assert!(!status[1].enabled);
        assert_eq!(f.orchestrator.enabled_modules(), vec!["b"]);
    }
}
