//! 모듈 작업 슬롯.
//!
//! 모듈 하나의 백그라운드 작업 핸들과 `active` 플래그를 보관한다.
//! 시작할 때마다 새 플래그를 만들어, 정지 후 아직 빠져나가는 중인 이전
//! 작업이 새 작업의 플래그를 보지 않도록 한다.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use autodoor_core::state::{AtomicCell, RunState};

/// 루프가 반복마다 확인하는 실행 조건
#[derive(Clone)]
pub struct LoopGuard {
    run_state: Arc<RunState>,
    active: Arc<AtomicCell<bool>>,
}

impl LoopGuard {
    /// 전역 실행 플래그와 모듈 플래그가 모두 켜져 있는지
    pub fn should_run(&self) -> bool {
        self.run_state.is_running() && self.active.get()
    }

    /// 일시정지 중인지
    pub fn is_paused(&self) -> bool {
        self.run_state.is_paused()
    }
}

struct SlotInner {
    active: Arc<AtomicCell<bool>>,
    handle: Option<JoinHandle<()>>,
}

/// 모듈 작업 슬롯
pub struct TaskSlot {
    run_state: Arc<RunState>,
    inner: Mutex<SlotInner>,
}

impl TaskSlot {
    /// 빈 슬롯 생성
    pub fn new(run_state: Arc<RunState>) -> Self {
        Self {
            run_state,
            inner: Mutex::new(SlotInner {
                active: Arc::new(AtomicCell::new(false)),
                handle: None,
            }),
        }
    }

    /// 작업 시작. 이미 살아 있는 작업이 있으면 아무것도 하지 않고 `false`.
    pub fn start<F, Fut>(&self, task: F) -> bool
    where
        F: FnOnce(LoopGuard) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let alive = inner.handle.as_ref().is_some_and(|h| !h.is_finished());
        if alive && inner.active.get() {
            return false;
        }

        let active = Arc::new(AtomicCell::new(true));
        let guard = LoopGuard {
            run_state: self.run_state.clone(),
            active: active.clone(),
        };
        // 정지됐지만 아직 빠져나가는 이전 작업은 분리된다
        inner.active = active;
        inner.handle = Some(tokio::spawn(task(guard)));
        true
    }

    /// 정지 신호. 시작한 적이 없어도 안전하다.
    pub fn stop(&self) {
        self.inner.lock().active.set(false);
    }

    /// 작업이 살아 있고 정지 신호를 받지 않았는지
    pub fn is_running(&self) -> bool {
        let inner = self.inner.lock();
        inner.active.get() && inner.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 조인할 핸들 회수
    pub fn take_task(&self) -> Option<JoinHandle<()>> {
        self.inner.lock().handle.take()
    }
}
