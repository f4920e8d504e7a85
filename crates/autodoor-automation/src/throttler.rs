//! 액션 스로틀러.
//!
//! 모든 물리 액션(이동+클릭, 키 입력)을 시스템 전역 락으로 직렬화한다.
//! 락을 잡은 동안 다른 디스패치의 하위 단계가 끼어들 수 없다.
//!
//! 디스패치 순서:
//! 1. 직전 작업 이후 `operation_interval`이 지나지 않았으면 남은 시간 대기
//! 2. 이동+클릭
//! 3. `last_operation_time` 갱신
//! 4. `operation_interval` 대기 (클릭과 키 입력 분리)
//! 5. 키 입력 (설정된 경우)
//! 6. `last_operation_time` 갱신
//!
//! 입력 실패는 로그와 상태 메시지로만 남기고 호출자에게 전파하지 않는다.
//! 디스패치는 "최대 한 번 시도"이며 전달을 보장하지 않는다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use autodoor_core::models::action::ActionRequest;
use autodoor_core::ports::control_surface::StatusSink;
use autodoor_core::ports::input_injector::InputInjector;
use autodoor_core::state::AtomicCell;

/// 기본 하위 단계 간격
pub const DEFAULT_OPERATION_INTERVAL: Duration = Duration::from_millis(500);

/// 디스패치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// 클릭 성공 여부
    pub clicked: bool,
    /// 키 입력 성공 여부
    pub key_pressed: bool,
    /// 실패한 단계 메시지
    pub failures: Vec<String>,
    /// 디스패치 완료 시각
    pub completed_at: Instant,
}

impl DispatchReport {
    /// 실패 없이 끝났는지
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 시스템 전역 액션 스로틀러
pub struct ActionThrottler {
    injector: Arc<dyn InputInjector>,
    operation_interval: Duration,
    /// 디스패치 직렬화 락
    action_lock: Mutex<()>,
    /// 마지막 물리 작업 시각
    last_operation: AtomicCell<Option<Instant>>,
    /// 누적 디스패치 수
    dispatch_count: AtomicCell<u64>,
    status: Option<Arc<dyn StatusSink>>,
}

impl ActionThrottler {
    /// 새 스로틀러 생성
    pub fn new(injector: Arc<dyn InputInjector>, operation_interval: Duration) -> Self {
        Self {
            injector,
            operation_interval,
            action_lock: Mutex::new(()),
            last_operation: AtomicCell::new(None),
            dispatch_count: AtomicCell::new(0),
            status: None,
        }
    }

    /// 상태 메시지 수신자 설정
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status = Some(sink);
        self
    }

    /// 하위 단계 간격
    pub fn operation_interval(&self) -> Duration {
        self.operation_interval
    }

    /// 마지막 물리 작업 시각
    pub fn last_operation_time(&self) -> Option<Instant> {
        self.last_operation.get()
    }

    /// 누적 디스패치 수
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.get()
    }

    /// 액션 디스패치 (직렬화)
    pub async fn dispatch(&self, request: &ActionRequest) -> DispatchReport {
        let _guard = self.action_lock.lock().await;
        let seq = self.dispatch_count.increment(1);

        if let Some(last) = self.last_operation.get() {
            let elapsed = last.elapsed();
            if elapsed < self.operation_interval {
                let wait = self.operation_interval - elapsed;
                debug!(seq, wait_ms = wait.as_millis() as u64, "작업 간격 대기");
                self.publish("작업 간격 대기 중");
                tokio::time::sleep(wait).await;
            }
        }

        let mut clicked = false;
        let mut key_pressed = false;
        let mut failures = Vec::new();

        if let Some(pos) = request.position {
            self.publish(&format!("클릭 ({}, {})", pos.x, pos.y));
            match self.injector.move_and_click(pos.x, pos.y).await {
                Ok(()) => clicked = true,
                Err(e) => {
                    warn!(seq, x = pos.x, y = pos.y, "클릭 실패: {e}");
                    self.publish(&format!("클릭 실패: {e}"));
                    failures.push(format!("click: {e}"));
                }
            }
            self.last_operation.set(Some(Instant::now()));

            if request.key.is_some() {
                tokio::time::sleep(self.operation_interval).await;
            }
        }

        if let Some(key) = &request.key {
            self.publish(&format!("키 입력 {key}"));
            match self.injector.press_key(key).await {
                Ok(()) => key_pressed = true,
                Err(e) => {
                    warn!(seq, key = %key, "키 입력 실패: {e}");
                    self.publish(&format!("키 입력 실패: {e}"));
                    failures.push(format!("key: {e}"));
                }
            }
        }

        let completed_at = Instant::now();
        self.last_operation.set(Some(completed_at));

        if failures.is_empty() {
            info!(seq, clicked, key_pressed, "액션 디스패치 완료");
            self.publish("액션 완료");
        }

        DispatchReport {
            clicked,
            key_pressed,
            failures,
            completed_at,
        }
    }

    fn publish(&self, message: &str) {
        if let Some(sink) = &self.status {
            sink.publish_status(message);
        }
    }
}
