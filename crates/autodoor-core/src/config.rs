//! 애플리케이션 설정 구조체.
//!
//! 감시 영역, 트리거 키워드/키, 폴링·쿨다운 간격, 단축키, 인식 엔진 경로,
//! 모듈별 설정을 정의한다. 모든 필드에 기본값이 있어 누락된 키는 기본값으로,
//! 알 수 없는 키는 무시된다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::keys::is_recognized_key;
use crate::models::region::Region;

/// OCR 트리거 모듈 이름
pub const MODULE_OCR_TRIGGER: &str = "ocr_trigger";
/// 타이머 작업 모듈 이름
pub const MODULE_TIMED_TASK: &str = "timed_task";
/// 숫자 인식 모듈 이름
pub const MODULE_NUMBER_RECOGNITION: &str = "number_recognition";
/// 스크립트 매크로 모듈 이름
pub const MODULE_SCRIPTED_MACRO: &str = "scripted_macro";
/// 색상 인식 모듈 이름
pub const MODULE_COLOR_RECOGNITION: &str = "color_recognition";

/// 알려진 모듈 이름 전체 (등록 순서)
pub const MODULE_NAMES: [&str; 5] = [
    MODULE_OCR_TRIGGER,
    MODULE_TIMED_TASK,
    MODULE_NUMBER_RECOGNITION,
    MODULE_SCRIPTED_MACRO,
    MODULE_COLOR_RECOGNITION,
];

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OCR 감시 영역
    pub region: Region,
    /// 트리거 키워드 (대소문자 무시 부분 일치)
    pub trigger_keywords: Vec<String>,
    /// 클릭 후 누를 키 (없으면 클릭만)
    pub trigger_key: Option<String>,
    /// 폴링 간격 (초, > 0)
    pub poll_interval_secs: f64,
    /// 액션 쿨다운 (초, >= 0)
    pub action_cooldown_secs: f64,
    /// 액션 하위 단계 간격 (초, > 0)
    pub operation_interval_secs: f64,
    /// 정지 시 작업 조인 대기 한도 (초, > 0)
    pub join_timeout_secs: f64,
    /// 일시적 오류 후 대기 (초, > 0)
    pub error_backoff_secs: f64,
    /// 시작 단축키
    pub start_hotkey: String,
    /// 정지 단축키
    pub stop_hotkey: String,
    /// 인식 엔진 설정
    pub recognition: RecognitionConfig,
    /// 시작 시 활성화할 모듈
    pub enabled_modules: Vec<String>,
    /// 숫자 인식 모듈 설정
    pub number: NumberModuleConfig,
    /// 색상 인식 모듈 설정
    pub color: ColorModuleConfig,
    /// 타이머 작업 모듈 설정
    pub timed: TimedTaskConfig,
    /// 스크립트 매크로 모듈 설정
    pub script: MacroConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            region: Region::default(),
            trigger_keywords: vec!["door".to_string()],
            trigger_key: Some("e".to_string()),
            poll_interval_secs: 1.0,
            action_cooldown_secs: 5.0,
            operation_interval_secs: 0.5,
            join_timeout_secs: 2.0,
            error_backoff_secs: 1.0,
            start_hotkey: "F10".to_string(),
            stop_hotkey: "F12".to_string(),
            recognition: RecognitionConfig::default(),
            enabled_modules: vec![MODULE_OCR_TRIGGER.to_string()],
            number: NumberModuleConfig::default(),
            color: ColorModuleConfig::default(),
            timed: TimedTaskConfig::default(),
            script: MacroConfig::default(),
        }
    }

    /// 폴링 간격
    pub fn poll_interval(&self) -> Duration {
        secs(self.poll_interval_secs)
    }

    /// 액션 쿨다운
    pub fn action_cooldown(&self) -> Duration {
        secs(self.action_cooldown_secs)
    }

    /// 액션 하위 단계 간격
    pub fn operation_interval(&self) -> Duration {
        secs(self.operation_interval_secs)
    }

    /// 조인 타임아웃
    pub fn join_timeout(&self) -> Duration {
        secs(self.join_timeout_secs)
    }

    /// 오류 백오프
    pub fn error_backoff(&self) -> Duration {
        secs(self.error_backoff_secs)
    }

    /// 전체 설정 검증. 첫 번째 위반 필드를 에러로 반환한다.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.region.validate()?;
        positive("poll_interval_secs", self.poll_interval_secs)?;
        non_negative("action_cooldown_secs", self.action_cooldown_secs)?;
        positive("operation_interval_secs", self.operation_interval_secs)?;
        positive("join_timeout_secs", self.join_timeout_secs)?;
        positive("error_backoff_secs", self.error_backoff_secs)?;
        if let Some(key) = &self.trigger_key {
            known_key("trigger_key", key)?;
        }
        if self.start_hotkey.trim().is_empty() {
            return Err(CoreError::validation("start_hotkey", "비어 있습니다"));
        }
        if self.stop_hotkey.trim().is_empty() {
            return Err(CoreError::validation("stop_hotkey", "비어 있습니다"));
        }
        for name in &self.enabled_modules {
            if !MODULE_NAMES.contains(&name.as_str()) {
                return Err(CoreError::validation(
                    "enabled_modules",
                    format!("알 수 없는 모듈: {name}"),
                ));
            }
        }
        if self.is_enabled(MODULE_OCR_TRIGGER)
            && self.trigger_keywords.iter().all(|k| k.trim().is_empty())
        {
            return Err(CoreError::validation(
                "trigger_keywords",
                "OCR 트리거에는 키워드가 하나 이상 필요합니다",
            ));
        }
        self.recognition.validate()?;
        self.number.validate()?;
        self.color.validate()?;
        self.timed.validate()?;
        self.script.validate()?;
        Ok(())
    }

    /// 모듈이 활성화 목록에 있는지
    pub fn is_enabled(&self, module: &str) -> bool {
        self.enabled_modules.iter().any(|m| m == module)
    }
}

// ============================================================
// 인식 엔진 설정
// ============================================================

/// Tesseract 인식 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// tesseract 실행 파일 경로
    pub binary_path: PathBuf,
    /// 인식 언어 (예: "eng", "kor+eng")
    pub language: String,
    /// 인식 1회 타임아웃 (초)
    pub timeout_secs: f64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            timeout_secs: 10.0,
        }
    }
}

impl RecognitionConfig {
    /// 인식 타임아웃
    pub fn timeout(&self) -> Duration {
        secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.binary_path.as_os_str().is_empty() {
            return Err(CoreError::validation(
                "recognition.binary_path",
                "비어 있습니다",
            ));
        }
        positive("recognition.timeout_secs", self.timeout_secs)
    }
}

// ============================================================
// 숫자 인식 모듈
// ============================================================

/// 숫자 비교 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberComparison {
    /// 인식값 < 임계값이면 트리거
    Below,
    /// 인식값 > 임계값이면 트리거
    Above,
}

/// 숫자 인식 모듈 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberModuleConfig {
    /// 숫자 영역
    pub region: Region,
    /// 임계값
    pub threshold: f64,
    /// 비교 방향
    pub comparison: NumberComparison,
    /// 누를 키
    pub key: String,
    /// 폴링 간격 (초)
    pub poll_interval_secs: f64,
    /// 쿨다운 (초)
    pub cooldown_secs: f64,
}

impl Default for NumberModuleConfig {
    fn default() -> Self {
        Self {
            region: Region::new(0, 0, 200, 50),
            threshold: 30.0,
            comparison: NumberComparison::Below,
            key: "1".to_string(),
            poll_interval_secs: 1.0,
            cooldown_secs: 5.0,
        }
    }
}

impl NumberModuleConfig {
    fn validate(&self) -> Result<(), CoreError> {
        self.region.validate()?;
        if !self.threshold.is_finite() {
            return Err(CoreError::validation("number.threshold", "유한한 값이어야 합니다"));
        }
        known_key("number.key", &self.key)?;
        positive("number.poll_interval_secs", self.poll_interval_secs)?;
        non_negative("number.cooldown_secs", self.cooldown_secs)
    }
}

// ============================================================
// 색상 인식 모듈
// ============================================================

/// 색상 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorCondition {
    /// 목표 색상이 영역에 나타나면 트리거
    Present,
    /// 목표 색상이 영역에서 사라지면 트리거
    Absent,
}

/// 색상 인식 모듈 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorModuleConfig {
    /// 색상 영역
    pub region: Region,
    /// 목표 RGB
    pub target_rgb: [u8; 3],
    /// 채널별 허용 오차
    pub tolerance: u8,
    /// 일치 판정 최소 픽셀 비율 (0 < r <= 1)
    pub min_match_ratio: f64,
    /// 트리거 조건
    pub condition: ColorCondition,
    /// 누를 키
    pub key: String,
    /// 일치한 첫 픽셀 클릭 여부 (`Present` 조건에서만 의미)
    pub click_on_match: bool,
    /// 폴링 간격 (초)
    pub poll_interval_secs: f64,
    /// 쿨다운 (초)
    pub cooldown_secs: f64,
}

impl Default for ColorModuleConfig {
    fn default() -> Self {
        Self {
            region: Region::new(0, 0, 100, 20),
            target_rgb: [200, 30, 30],
            tolerance: 20,
            min_match_ratio: 0.05,
            condition: ColorCondition::Absent,
            key: "2".to_string(),
            click_on_match: false,
            poll_interval_secs: 0.5,
            cooldown_secs: 3.0,
        }
    }
}

impl ColorModuleConfig {
    fn validate(&self) -> Result<(), CoreError> {
        self.region.validate()?;
        if !(self.min_match_ratio > 0.0 && self.min_match_ratio <= 1.0) {
            return Err(CoreError::validation(
                "color.min_match_ratio",
                "0 초과 1 이하여야 합니다",
            ));
        }
        known_key("color.key", &self.key)?;
        positive("color.poll_interval_secs", self.poll_interval_secs)?;
        non_negative("color.cooldown_secs", self.cooldown_secs)
    }
}

// ============================================================
// 타이머 작업 모듈
// ============================================================

/// 주기적으로 누를 키
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTask {
    /// 누를 키
    pub key: String,
    /// 주기 (초, > 0)
    pub interval_secs: f64,
}

/// 타이머 작업 모듈 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedTaskConfig {
    /// 작업 목록
    pub tasks: Vec<TimedTask>,
    /// 대기 청크 상한 (초)
    pub check_interval_secs: f64,
}

impl Default for TimedTaskConfig {
    fn default() -> Self {
        Self {
            tasks: vec![TimedTask {
                key: "space".to_string(),
                interval_secs: 60.0,
            }],
            check_interval_secs: 1.0,
        }
    }
}

impl TimedTaskConfig {
    fn validate(&self) -> Result<(), CoreError> {
        positive("timed.check_interval_secs", self.check_interval_secs)?;
        for (i, task) in self.tasks.iter().enumerate() {
            known_key(&format!("timed.tasks[{i}].key"), &task.key)?;
            positive(&format!("timed.tasks[{i}].interval_secs"), task.interval_secs)?;
        }
        Ok(())
    }
}

// ============================================================
// 스크립트 매크로 모듈
// ============================================================

/// 매크로 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MacroStep {
    /// 전역 좌표 클릭
    Click { x: i32, y: i32 },
    /// 키 입력
    Key { key: String },
    /// 대기 (초)
    Wait { secs: f64 },
}

/// 스크립트 매크로 모듈 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    /// 실행할 단계 (반복)
    pub steps: Vec<MacroStep>,
    /// 한 바퀴 끝난 뒤 대기 (초)
    pub repeat_delay_secs: f64,
    /// 대기 청크 상한 (초)
    pub check_interval_secs: f64,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            repeat_delay_secs: 1.0,
            check_interval_secs: 1.0,
        }
    }
}

impl MacroConfig {
    fn validate(&self) -> Result<(), CoreError> {
        non_negative("script.repeat_delay_secs", self.repeat_delay_secs)?;
        positive("script.check_interval_secs", self.check_interval_secs)?;
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                MacroStep::Key { key } => known_key(&format!("script.steps[{i}].key"), key)?,
                MacroStep::Wait { secs } => {
                    non_negative(&format!("script.steps[{i}].secs"), *secs)?
                }
                MacroStep::Click { .. } => {}
            }
        }
        Ok(())
    }
}

// ============================================================
// 검증 헬퍼
// ============================================================

/// 초 → Duration (음수/비유한 값은 0)
pub fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// 시간 설정값 상한 (1년)
const MAX_SECS: f64 = 365.0 * 86_400.0;

fn positive(field: &str, value: f64) -> Result<(), CoreError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(CoreError::validation(field, "0보다 커야 합니다"));
    }
    within_limit(field, value)
}

fn non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(CoreError::validation(field, "0 이상이어야 합니다"));
    }
    within_limit(field, value)
}

fn within_limit(field: &str, value: f64) -> Result<(), CoreError> {
    if value <= MAX_SECS {
        Ok(())
    } else {
        Err(CoreError::validation(
            field,
            format!("{MAX_SECS}초(1년) 이하여야 합니다"),
        ))
    }
}

fn known_key(field: &str, key: &str) -> Result<(), CoreError> {
    if is_recognized_key(key) {
        Ok(())
    } else {
        Err(CoreError::validation(
            field,
            format!("인식할 수 없는 키 이름: {key:?}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let json = r#"{ "poll_interval_secs": 0.25, "region": { "x": 5, "y": 6, "width": 100, "height": 50 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!((config.poll_interval_secs - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.region, Region::new(5, 6, 100, 50));
        assert_eq!(config.trigger_keywords, vec!["door".to_string()]);
        assert_eq!(config.stop_hotkey, "F12");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{ "theme": "dark", "legacy_flag": 1, "start_hotkey": "F9" }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.start_hotkey, "F9");
    }

    #[test]
    fn duration_helpers() {
        let config = AppConfig::default_config();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.operation_interval(), Duration::from_millis(500));
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(f64::NAN), Duration::ZERO);
        assert_eq!(secs(1e20), Duration::MAX);
    }

    #[test]
    fn rejects_durations_beyond_a_year() {
        let config = AppConfig {
            action_cooldown_secs: 1e20,
            ..AppConfig::default_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("action_cooldown_secs"));

        let mut config = AppConfig::default_config();
        config.timed.check_interval_secs = 365.0 * 86_400.0 + 1.0;
        assert!(config.validate().is_err());

        let config = AppConfig {
            action_cooldown_secs: 86_400.0,
            ..AppConfig::default_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let config = AppConfig {
            poll_interval_secs: 0.0,
            ..AppConfig::default_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn cooldown_zero_is_allowed() {
        let config = AppConfig {
            action_cooldown_secs: 0.0,
            ..AppConfig::default_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_trigger_key() {
        let config = AppConfig {
            trigger_key: Some("hyper".to_string()),
            ..AppConfig::default_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_module() {
        let config = AppConfig {
            enabled_modules: vec!["fishing".to_string()],
            ..AppConfig::default_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn macro_steps_serde() {
        let json = r#"{ "steps": [
            { "type": "click", "x": 10, "y": 20 },
            { "type": "wait", "secs": 0.5 },
            { "type": "key", "key": "enter" }
        ] }"#;
        let config: MacroConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.steps.len(), 3);
        assert_eq!(config.steps[0], MacroStep::Click { x: 10, y: 20 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn macro_rejects_negative_wait() {
        let config = MacroConfig {
            steps: vec![MacroStep::Wait { secs: -1.0 }],
            ..MacroConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
