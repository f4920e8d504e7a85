//! 인식 엔진 포트.
//!
//! 구현: `autodoor-vision` crate (Tesseract CLI)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::Frame;
use crate::models::token::RecognizedToken;

/// 이미지 → 텍스트/토큰 인식 인터페이스
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// 프레임 전체 텍스트
    async fn recognize_text(&self, frame: &Frame) -> Result<String, CoreError>;

    /// 단어 단위 토큰 + 바운딩 박스 (프레임 로컬 좌표)
    async fn recognize_tokens(&self, frame: &Frame) -> Result<Vec<RecognizedToken>, CoreError>;

    /// 엔진 이름 (예: "tesseract-cli")
    fn engine_name(&self) -> &str;
}
