//! AUTODOOR 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 실패를 이 타입으로 매핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 설정, 캡처, 인식, 입력 주입, 모듈 라이프사이클 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 화면 캡처 실패
    #[error("캡처 에러: {0}")]
    Capture(String),

    /// 인식 엔진 실패 (OCR/숫자/색상)
    #[error("인식 에러: {0}")]
    Recognition(String),

    /// 마우스/키보드 입력 주입 실패
    #[error("입력 주입 에러: {0}")]
    Injection(String),

    /// 모듈 시작/정지 실패
    #[error("모듈 라이프사이클 에러 ({module}): {message}")]
    Lifecycle {
        /// 모듈 이름
        module: String,
        /// 실패 사유
        message: String,
    },

    /// 동일한 이름의 모듈이 이미 등록됨
    #[error("중복 모듈 등록: {0}")]
    DuplicateModule(String),

    /// 실행 타임아웃
    #[error("실행 타임아웃: {timeout_ms}ms 초과")]
    ExecutionTimeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 필드 유효성 검증 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
