//! 액션 요청.

use serde::{Deserialize, Serialize};

use super::region::Position;

/// 트리거 감지 시 디스패치할 물리 액션
///
/// `position`이 있으면 이동+클릭, `key`가 있으면 키 입력. 둘 다 있으면
/// 클릭 → 간격 대기 → 키 입력 순서로 실행된다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// 클릭 좌표 (전역)
    pub position: Option<Position>,
    /// 누를 키 이름
    pub key: Option<String>,
}

impl ActionRequest {
    /// 클릭(+선택적 키) 요청
    pub fn click(position: Position, key: Option<String>) -> Self {
        Self {
            position: Some(position),
            key,
        }
    }

    /// 키 입력만 요청
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            position: None,
            key: Some(key.into()),
        }
    }

    /// 실행할 단계가 없는 요청인지
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.key.is_none()
    }
}
