//! 캡처 프레임.

use std::sync::Arc;

/// 캡처된 영역 이미지 (RGBA8, 행 우선)
///
/// 픽셀 버퍼는 `Arc`로 공유되어 복제가 저렴하다.
/// `PartialEq`는 크기와 픽셀을 비트 단위로 비교한다 (중복 프레임 감지용).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Frame {
    /// RGBA 버퍼로 프레임 생성
    ///
    /// 버퍼 길이가 `width * height * 4`와 다르면 `None`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// 단색 프레임 생성
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// 너비
    pub fn width(&self) -> u32 {
        self.width
    }

    /// 높이
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA 원시 버퍼
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// (x, y) 픽셀 RGBA
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// 픽셀 반복자: (x, y, rgba)
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, [u8; 4])> + '_ {
        let width = self.width.max(1);
        self.pixels.chunks_exact(4).enumerate().map(move |(i, p)| {
            let i = i as u32;
            (i % width, i / width, [p[0], p[1], p[2], p[3]])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_buffer_len() {
        assert!(Frame::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn equality_is_bitwise() {
        let a = Frame::filled(4, 4, [1, 2, 3, 255]);
        let b = Frame::filled(4, 4, [1, 2, 3, 255]);
        let c = Frame::filled(4, 4, [1, 2, 4, 255]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn pixel_lookup() {
        let mut buf = vec![0u8; 3 * 2 * 4];
        // (2, 1) 픽셀만 빨간색
        let idx = (3 + 2) * 4;
        buf[idx..idx + 4].copy_from_slice(&[255, 0, 0, 255]);
        let frame = Frame::from_rgba(3, 2, buf).unwrap();
        assert_eq!(frame.pixel(2, 1), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(3, 0), None);
        let red: Vec<_> = frame.pixels().filter(|(_, _, p)| p[0] == 255).collect();
        assert_eq!(red, vec![(2, 1, [255, 0, 0, 255])]);
    }
}
