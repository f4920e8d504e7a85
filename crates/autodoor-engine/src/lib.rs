//! # autodoor-engine
//!
//! 화면 트리거 자동화의 동시성/상태 핵심.
//!
//! - [`trigger_loop`]: 캡처 → 인식 → 쿨다운 → 디스패치 폴링 루프
//! - [`pacing`]: 청크 단위 협조적 대기
//! - [`task_slot`]: 모듈 작업 핸들과 정지 플래그
//! - [`modules`]: OCR 트리거, 타이머 작업, 숫자 인식, 스크립트 매크로, 색상 인식
//! - [`registry`]: 이름 고유 모듈 등록 테이블
//! - [`orchestrator`]: 일괄 시작/정지
//! - [`control_panel`]: 헤드리스 컨트롤 표면

pub mod control_panel;
pub mod modules;
pub mod orchestrator;
pub mod pacing;
pub mod registry;
pub mod task_slot;
pub mod trigger_loop;
