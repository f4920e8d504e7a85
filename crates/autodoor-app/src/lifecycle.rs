//! 종료 처리.
//!
//! 종료 사유를 한 번만 기록하고 구독자(콘솔)를 깨운다. 프로세스가 끝나기 전
//! [`Lifecycle::finish`]가 오케스트레이터의 `stop_all`을 실행해, 입력 주입기와
//! 캡처 리소스가 해제되기 전에 모든 모듈 작업이 멈추도록 한다.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use autodoor_engine::orchestrator::{Orchestrator, StopReport};

/// 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// 콘솔 `quit`
    Quit,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "quit",
        })
    }
}

/// 종료 수신기. `Some`이 되면 종료 중.
pub type ShutdownReceiver = watch::Receiver<Option<ShutdownReason>>;

/// 프로세스 종료 조정자
pub struct Lifecycle {
    orchestrator: Arc<Orchestrator>,
    reason_tx: watch::Sender<Option<ShutdownReason>>,
}

impl Lifecycle {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let (reason_tx, _) = watch::channel(None);
        Self {
            orchestrator,
            reason_tx,
        }
    }

    /// 종료 사유 구독
    pub fn subscribe(&self) -> ShutdownReceiver {
        self.reason_tx.subscribe()
    }

    /// 기록된 종료 사유
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.reason_tx.borrow()
    }

    /// 종료 요청. 처음 요청한 사유만 남으며, 기록됐으면 `true`.
    pub fn request_shutdown(&self, reason: ShutdownReason) -> bool {
        let recorded = self.reason_tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if recorded {
            info!(%reason, "종료 요청");
        }
        recorded
    }

    /// OS 시그널을 기다렸다가 종료를 요청하는 작업 실행
    pub fn spawn_signal_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            match next_signal().await {
                Ok(reason) => {
                    lifecycle.request_shutdown(reason);
                }
                Err(e) => error!("시그널 핸들러 등록 실패: {e}"),
            }
        })
    }

    /// 모든 모듈 정지 후 결과 반환. 종료 사유가 없으면 `Quit`으로 기록한다.
    pub async fn finish(&self) -> StopReport {
        self.request_shutdown(ShutdownReason::Quit);
        let report = self.orchestrator.stop_all().await;
        if report.is_clean() {
            info!(reason = ?self.reason(), "모듈 정지 완료");
        } else {
            warn!(?report, "정지 중 문제 발생");
        }
        report
    }
}

/// 다음 종료 시그널
async fn next_signal() -> std::io::Result<ShutdownReason> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = interrupt.recv() => Ok(ShutdownReason::Interrupt),
            _ = terminate.recv() => Ok(ShutdownReason::Terminate),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(ShutdownReason::Interrupt)
    }
}
