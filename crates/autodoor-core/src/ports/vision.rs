//! 트리거 감지 포트.
//!
//! 구현: `autodoor-vision` crate (키워드/숫자/색상 감지기)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::action::ActionRequest;
use crate::models::frame::Frame;

/// 한 프레임에 대한 감지 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// 트리거 조건 없음
    Clear,
    /// 조건은 맞았지만 액션 위치를 확정하지 못함 (이번 반복은 미감지로 처리)
    Unresolved(String),
    /// 트리거: 디스패치할 액션
    Triggered(ActionRequest),
}

/// 트리거 감지기: 프레임을 인식하고 조건을 판정한다
///
/// 한 루프 인스턴스가 소유하며 프레임 획득 순서대로 호출된다.
#[async_trait]
pub trait TriggerDetector: Send {
    /// 프레임 판정
    async fn detect(&mut self, frame: &Frame) -> Result<Detection, CoreError>;

    /// 감지기 이름 (로그용)
    fn name(&self) -> &str;
}
