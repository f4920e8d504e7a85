//! 도메인 모델.
//!
//! 캡처 영역, 프레임, 인식 토큰, 액션 요청을 정의한다.

pub mod action;
pub mod frame;
pub mod region;
pub mod token;
