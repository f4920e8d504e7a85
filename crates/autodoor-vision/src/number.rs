//! 숫자 인식 감지기.
//!
//! 영역 텍스트에서 첫 번째 숫자를 추출해 임계값과 비교한다.
//! `"HP 120/300"` → 120. 숫자가 없으면 미감지로 처리한다.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use autodoor_core::config::NumberComparison;
use autodoor_core::error::CoreError;
use autodoor_core::models::action::ActionRequest;
use autodoor_core::models::frame::Frame;
use autodoor_core::ports::recognition::RecognitionEngine;
use autodoor_core::ports::vision::{Detection, TriggerDetector};

/// 숫자 감지기
pub struct NumberDetector {
    engine: Arc<dyn RecognitionEngine>,
    threshold: f64,
    comparison: NumberComparison,
    key: String,
}

impl NumberDetector {
    /// 새 감지기 생성
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        threshold: f64,
        comparison: NumberComparison,
        key: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            threshold,
            comparison,
            key: key.into(),
        }
    }

    /// 값이 트리거 조건을 만족하는지
    pub fn is_triggered(&self, value: f64) -> bool {
        match self.comparison {
            NumberComparison::Below => value < self.threshold,
            NumberComparison::Above => value > self.threshold,
        }
    }
}

#[async_trait]
impl TriggerDetector for NumberDetector {
    async fn detect(&mut self, frame: &Frame) -> Result<Detection, CoreError> {
        let text = self.engine.recognize_text(frame).await?;
        let Some(value) = parse_first_number(&text) else {
            debug!(text = %text, "숫자 없음");
            return Ok(Detection::Clear);
        };
        debug!(value, "인식 숫자");

        if self.is_triggered(value) {
            info!(value, threshold = self.threshold, "숫자 조건 충족");
            Ok(Detection::Triggered(ActionRequest::key(self.key.clone())))
        } else {
            Ok(Detection::Clear)
        }
    }

    fn name(&self) -> &str {
        "number"
    }
}

/// 텍스트의 첫 번째 숫자 (부호, 소수점, 천 단위 쉼표 허용)
pub fn parse_first_number(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let negative = start > 0 && chars[start - 1] == '-';
    let mut digits = String::new();
    let mut seen_dot = false;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        match c {
            '0'..='9' => digits.push(c),
            '.' if !seen_dot && next_is_digit => {
                seen_dot = true;
                digits.push('.');
            }
            ',' if !seen_dot && is_thousands_group(&chars, start, i) => {}
            _ => break,
        }
        i += 1;
    }

    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `chars[comma]`의 쉼표가 천 단위 구분자인지.
/// 뒤에 정확히 세 자리가 오고, 첫 그룹은 세 자리 이하여야 한다.
fn is_thousands_group(chars: &[char], start: usize, comma: usize) -> bool {
    let digit_at = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_digit());
    let first_group = chars[start..comma]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    first_group <= 3 && (1..=3).all(|k| digit_at(comma + k)) && !digit_at(comma + 4)
}
