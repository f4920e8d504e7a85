//! 프레임 소스 포트.
//!
//! 구현: `autodoor-vision` crate (xcap 기반 멀티모니터 캡처)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::Frame;
use crate::models::region::Region;

/// 화면 영역 캡처 인터페이스
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 전역 좌표 영역을 캡처한다. 영역이 여러 모니터에 걸쳐도 한 프레임으로 반환.
    async fn capture(&self, region: &Region) -> Result<Frame, CoreError>;
}
