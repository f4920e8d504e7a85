//! # autodoor-vision
//!
//! 화면 이미지 처리 크레이트.
//! 멀티모니터 영역 캡처, Tesseract CLI 기반 텍스트 인식,
//! 키워드/숫자/색상 트리거 감지기를 담당한다.

pub mod capture;
pub mod color;
pub mod number;
pub mod tesseract;
pub mod trigger;
