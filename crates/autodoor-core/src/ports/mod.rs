//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 각 어댑터 crate가 이 trait들을 구현하며,
//! `autodoor-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 비동기 trait은 `async_trait` 매크로를 사용하여 object safety를 보장한다.

pub mod control_surface;
pub mod frame_source;
pub mod input_injector;
pub mod module;
pub mod recognition;
pub mod vision;
