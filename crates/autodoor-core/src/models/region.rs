//! 화면 영역과 좌표.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 전역 화면 좌표 (여러 모니터에 걸친 가상 데스크톱 기준)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// X 좌표
    pub x: i32,
    /// Y 좌표
    pub y: i32,
}

impl Position {
    /// 새 좌표 생성
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 모니터링 대상 화면 영역
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// 좌상단 X (전역 좌표)
    pub x: i32,
    /// 좌상단 Y (전역 좌표)
    pub y: i32,
    /// 너비 (> 0)
    pub width: u32,
    /// 높이 (> 0)
    pub height: u32,
}

impl Region {
    /// 새 영역 생성
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 영역 원점
    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// 영역 로컬 좌표 → 전역 좌표
    pub fn to_global(&self, local_x: i32, local_y: i32) -> Position {
        Position::new(self.x + local_x, self.y + local_y)
    }

    /// 오른쪽 끝 (exclusive)
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// 아래쪽 끝 (exclusive)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// 두 영역의 교집합 (겹치지 않으면 `None`)
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let left = self.x.max(other.x) as i64;
        let top = self.y.max(other.y) as i64;
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Region::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// 크기 검증: 너비/높이 모두 0보다 커야 한다
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 {
            return Err(CoreError::validation("region.width", "0보다 커야 합니다"));
        }
        if self.height == 0 {
            return Err(CoreError::validation("region.height", "0보다 커야 합니다"));
        }
        Ok(())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new(0, 0, 800, 600)
    }
}
