//! 인식 토큰.

use serde::{Deserialize, Serialize};

use super::region::{Position, Region};

/// 인식된 단어와 바운딩 박스 (영역 로컬 좌표)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedToken {
    /// 인식된 텍스트
    pub text: String,
    /// 바운딩 박스 왼쪽
    pub left: i32,
    /// 바운딩 박스 위쪽
    pub top: i32,
    /// 바운딩 박스 너비
    pub width: u32,
    /// 바운딩 박스 높이
    pub height: u32,
}

impl RecognizedToken {
    /// 로컬 좌표 기준 중심점 (정수 나눗셈)
    pub fn local_center(&self) -> (i32, i32) {
        (
            self.left + (self.width / 2) as i32,
            self.top + (self.height / 2) as i32,
        )
    }

    /// 전역 좌표 기준 중심점
    pub fn global_center(&self, region: &Region) -> Position {
        let (x, y) = self.local_center();
        region.to_global(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_uses_integer_division() {
        let token = RecognizedToken {
            text: "door".to_string(),
            left: 10,
            top: 20,
            width: 40,
            height: 15,
        };
        assert_eq!(token.local_center(), (30, 27));
        assert_eq!(
            token.global_center(&Region::new(0, 0, 800, 600)),
            Position::new(30, 27)
        );
        assert_eq!(
            token.global_center(&Region::new(100, 200, 800, 600)),
            Position::new(130, 227)
        );
    }
}
