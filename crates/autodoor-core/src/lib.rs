//! # autodoor-core
//!
//! AUTODOOR 도메인 모델, 포트(trait) 정의, 상태 프리미티브, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 도메인 데이터 구조체 (영역, 프레임, 토큰, 액션 요청)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`state`]: 스레드 안전 상태 셀과 공유 실행 상태
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/병합/저장)
//! - [`keys`]: 인식 가능한 키 이름 목록

pub mod config;
pub mod config_manager;
pub mod error;
pub mod keys;
pub mod models;
pub mod ports;
pub mod state;
