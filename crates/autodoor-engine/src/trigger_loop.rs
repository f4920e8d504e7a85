//! 트리거-액션 루프.
//!
//! 프레임 획득 → 인식/판정 → 쿨다운 확인 → 디스패치 → 대기를 실행 플래그가
//! 꺼질 때까지 반복한다.
//!
//! - 직전 프레임과 동일하면 인식을 건너뛴다.
//! - 쿨다운 중이면 남은 시간을 `min(remaining, 10 × poll)` 청크로 나눠 자고,
//!   디스패치 없이 폴링으로 돌아간다.
//! - 캡처/인식 오류는 일시적으로 보고 백오프 후 계속한다.
//! - 일시정지 중에는 캡처와 디스패치를 모두 건너뛴다.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::region::Region;
use autodoor_core::ports::frame_source::FrameSource;
use autodoor_core::ports::vision::{Detection, TriggerDetector};

use crate::pacing::{cooldown_chunk, cooldown_remaining, cooperative_sleep};
use crate::task_slot::LoopGuard;

/// 루프 타이밍 설정
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    /// 감시 영역 (전역 좌표)
    pub region: Region,
    /// 반복 간 대기
    pub poll_interval: Duration,
    /// 디스패치 간 최소 간격
    pub cooldown: Duration,
    /// 일시적 오류 후 대기
    pub error_backoff: Duration,
}

/// 트리거-액션 루프 인스턴스
pub struct TriggerLoop {
    module: String,
    settings: LoopSettings,
    source: Arc<dyn FrameSource>,
    detector: Box<dyn TriggerDetector>,
    throttler: Arc<ActionThrottler>,
    previous_frame: Option<Frame>,
    last_action_time: Option<Instant>,
}

impl TriggerLoop {
    /// 새 루프 생성
    pub fn new(
        module: impl Into<String>,
        settings: LoopSettings,
        source: Arc<dyn FrameSource>,
        detector: Box<dyn TriggerDetector>,
        throttler: Arc<ActionThrottler>,
    ) -> Self {
        Self {
            module: module.into(),
            settings,
            source,
            detector,
            throttler,
            previous_frame: None,
            last_action_time: None,
        }
    }

    /// 실행 플래그가 꺼질 때까지 반복
    pub async fn run(mut self, guard: LoopGuard) {
        info!(
            module = %self.module,
            detector = self.detector.name(),
            poll_ms = self.settings.poll_interval.as_millis() as u64,
            cooldown_ms = self.settings.cooldown.as_millis() as u64,
            "트리거 루프 시작"
        );

        while guard.should_run() {
            if guard.is_paused() {
                tokio::time::sleep(self.settings.poll_interval).await;
                continue;
            }

            let frame = match self.source.capture(&self.settings.region).await {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(module = %self.module, "캡처 실패: {e}");
                    tokio::time::sleep(self.settings.error_backoff).await;
                    continue;
                }
            };

            if self.previous_frame.as_ref() == Some(&frame) {
                trace!(module = %self.module, "동일 프레임, 인식 생략");
                tokio::time::sleep(self.settings.poll_interval).await;
                continue;
            }

            let detection = match self.detector.detect(&frame).await {
                Ok(detection) => detection,
                Err(e) => {
                    warn!(module = %self.module, "인식 실패: {e}");
                    tokio::time::sleep(self.settings.error_backoff).await;
                    continue;
                }
            };

            match detection {
                Detection::Clear => {
                    self.previous_frame = Some(frame);
                }
                Detection::Unresolved(reason) => {
                    debug!(module = %self.module, %reason, "트리거 위치 미확정");
                    self.previous_frame = Some(frame);
                }
                Detection::Triggered(request) => {
                    // 트리거 화면이 그대로여도 쿨다운 뒤 다시 판정한다
                    self.previous_frame = None;

                    let now = Instant::now();
                    if let Some(remaining) =
                        cooldown_remaining(self.last_action_time, self.settings.cooldown, now)
                    {
                        debug!(
                            module = %self.module,
                            remaining_ms = remaining.as_millis() as u64,
                            "쿨다운 중, 디스패치 생략"
                        );
                        let chunk = cooldown_chunk(remaining, self.settings.poll_interval);
                        if !cooperative_sleep(remaining, chunk, || guard.should_run()).await {
                            break;
                        }
                        continue;
                    }

                    if !guard.should_run() {
                        break;
                    }
                    let report = self.throttler.dispatch(&request).await;
                    self.last_action_time = Some(Instant::now());
                    info!(
                        module = %self.module,
                        clicked = report.clicked,
                        key_pressed = report.key_pressed,
                        failures = report.failures.len(),
                        "트리거 액션 디스패치"
                    );
                }
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }

        info!(module = %self.module, "트리거 루프 종료");
    }
}
