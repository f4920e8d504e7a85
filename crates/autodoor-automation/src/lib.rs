//! # autodoor-automation
//!
//! 입력 주입 크레이트.
//! 마우스/키보드 입력 주입기와, 모든 물리 액션을 시스템 전역으로 직렬화하고
//! 하위 단계 간격을 강제하는 액션 스로틀러를 담당한다.

pub mod input_driver;
pub mod throttler;
