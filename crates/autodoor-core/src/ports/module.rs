//! 모니터링 모듈 포트.
//!
//! 오케스트레이터가 일괄 시작/정지하는 모듈 인터페이스.
//! 모듈은 등록 시점에 구체 객체로 해석되며, 호출 시 문자열 경로로
//! 찾지 않는다.

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::CoreError;

/// 독립적으로 실행되는 모니터링 모듈
#[async_trait]
pub trait MonitorModule: Send + Sync {
    /// 레지스트리 고유 키 (예: "ocr_trigger")
    fn name(&self) -> &str;

    /// UI/로그 표시 이름
    fn label(&self) -> &str;

    /// 백그라운드 작업 시작.
    ///
    /// 이미 실행 중이면 작업을 중복 생성하지 않고 성공을 반환해야 한다.
    async fn start(&self) -> Result<(), CoreError>;

    /// 정지 신호.
    ///
    /// 여러 번 호출해도, 한 번도 시작하지 않았어도 안전해야 한다.
    async fn stop(&self) -> Result<(), CoreError>;

    /// 백그라운드 작업이 살아 있는지
    fn is_running(&self) -> bool;

    /// 조인할 백그라운드 작업 핸들 회수 (없으면 `None`)
    fn take_task(&self) -> Option<JoinHandle<()>> {
        None
    }
}
