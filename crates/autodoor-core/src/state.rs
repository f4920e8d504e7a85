//! 스레드 안전 상태 프리미티브.
//!
//! [`AtomicCell`]은 단일 값을 뮤텍스로 보호하며, 모든 읽기/쓰기는
//! 완전히 기록된 이전 값을 관찰한다. 내부 락은 get/set 자체에만 잡히고
//! sleep이나 외부 호출 동안에는 절대 유지되지 않는다.
//!
//! [`RunState`]는 모든 폴링 루프가 참조하는 프로세스 전역 실행 플래그다.

use std::ops::{AddAssign, SubAssign};

use parking_lot::Mutex;

/// 뮤텍스로 보호되는 단일 값 셀
#[derive(Debug, Default)]
pub struct AtomicCell<T> {
    value: Mutex<T>,
}

impl<T: Copy> AtomicCell<T> {
    /// 초기값으로 셀 생성
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// 현재 값
    pub fn get(&self) -> T {
        *self.value.lock()
    }

    /// 값 저장
    pub fn set(&self, value: T) {
        *self.value.lock() = value;
    }

    /// 값을 교체하고 이전 값 반환
    pub fn swap(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.lock(), value)
    }

    /// 클로저로 값을 갱신하고 새 값 반환
    ///
    /// 클로저는 락을 잡은 채 실행되므로 블로킹 작업을 넣으면 안 된다.
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(T) -> T,
    {
        let mut guard = self.value.lock();
        *guard = f(*guard);
        *guard
    }
}

impl<T: Copy + AddAssign + SubAssign> AtomicCell<T> {
    /// `delta`만큼 증가시키고 새 값 반환
    pub fn increment(&self, delta: T) -> T {
        let mut guard = self.value.lock();
        *guard += delta;
        *guard
    }

    /// `delta`만큼 감소시키고 새 값 반환
    pub fn decrement(&self, delta: T) -> T {
        let mut guard = self.value.lock();
        *guard -= delta;
        *guard
    }
}

/// 공유 실행 상태
///
/// `running`과 `paused`는 독립적이다. `paused == true`가 `running == true`를
/// 요구하지 않는다. 쓰기는 오케스트레이터만 수행한다.
#[derive(Debug, Default)]
pub struct RunState {
    running: AtomicCell<bool>,
    paused: AtomicCell<bool>,
}

impl RunState {
    /// 정지 상태로 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 실행 중 여부
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// 실행 플래그 설정, 이전 값 반환
    pub fn set_running(&self, running: bool) -> bool {
        self.running.swap(running)
    }

    /// 일시정지 여부
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// 일시정지 플래그 설정, 이전 값 반환
    pub fn set_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused)
    }
}
