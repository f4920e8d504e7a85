//! 입력 주입 포트.
//!
//! 마우스/키보드 조작을 위한 크로스 플랫폼 인터페이스를 정의한다.
//! 각 호출은 지연이 일정하지 않을 수 있다.

use async_trait::async_trait;

use crate::error::CoreError;

/// 입력 주입기: 마우스 이동+클릭, 키 입력
///
/// 구현체: `EnigoInputInjector` (실제 입력), `NoOpInputInjector` (드라이런)
#[async_trait]
pub trait InputInjector: Send + Sync {
    /// 전역 좌표로 이동 후 좌클릭
    async fn move_and_click(&self, x: i32, y: i32) -> Result<(), CoreError>;

    /// 키 한 번 누르고 떼기
    async fn press_key(&self, key: &str) -> Result<(), CoreError>;

    /// 플랫폼 이름 (예: "macos", "windows", "linux", "noop")
    fn platform(&self) -> &str;
}
