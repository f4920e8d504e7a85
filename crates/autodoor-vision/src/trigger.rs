//! 키워드 트리거 감지기.
//!
//! `TriggerDetector` 포트 구현. 토큰 인식 → 키워드 매칭 → 위치 확정.
//! 여러 단어로 된 키워드는 연속 토큰을 공백으로 이어 붙여 비교하고,
//! 일치한 토큰들의 합집합 박스 중심을 클릭 위치로 삼는다.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use autodoor_core::error::CoreError;
use autodoor_core::models::action::ActionRequest;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::region::{Position, Region};
use autodoor_core::models::token::RecognizedToken;
use autodoor_core::ports::recognition::RecognitionEngine;
use autodoor_core::ports::vision::{Detection, TriggerDetector};

/// 키워드 감지기: OCR 토큰에서 키워드를 찾아 클릭 위치를 계산
pub struct KeywordDetector {
    engine: Arc<dyn RecognitionEngine>,
    region: Region,
    /// 소문자로 정규화된 키워드
    keywords: Vec<String>,
    trigger_key: Option<String>,
}

impl KeywordDetector {
    /// 새 감지기 생성. 빈 키워드는 무시한다.
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        region: Region,
        keywords: &[String],
        trigger_key: Option<String>,
    ) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            engine,
            region,
            keywords,
            trigger_key,
        }
    }

    /// 토큰 목록에서 첫 번째로 일치하는 키워드와 전역 클릭 위치
    ///
    /// 키워드는 찾았지만 바운딩 박스 크기가 0이라 위치를 특정할 수 없으면
    /// `Err(keyword)`.
    pub fn locate(&self, tokens: &[RecognizedToken]) -> Option<Result<(String, Position), String>> {
        for keyword in &self.keywords {
            let words = keyword.split(' ').count();
            let Some(span) = find_span(tokens, keyword, words) else {
                continue;
            };
            return Some(match span_bounds(span) {
                Some((x, y)) => Ok((keyword.clone(), self.region.to_global(x, y))),
                None => Err(keyword.clone()),
            });
        }
        None
    }
}

#[async_trait]
impl TriggerDetector for KeywordDetector {
    async fn detect(&mut self, frame: &Frame) -> Result<Detection, CoreError> {
        let tokens = self.engine.recognize_tokens(frame).await?;
        let text = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(text = %text, "인식 텍스트");

        match self.locate(&tokens) {
            None => Ok(Detection::Clear),
            Some(Ok((keyword, position))) => {
                info!(keyword = %keyword, x = position.x, y = position.y, "키워드 감지");
                Ok(Detection::Triggered(ActionRequest::click(
                    position,
                    self.trigger_key.clone(),
                )))
            }
            Some(Err(keyword)) => Ok(Detection::Unresolved(format!(
                "키워드 '{keyword}' 위치를 특정할 수 없음"
            ))),
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// 연속 `words`개 토큰을 이어 붙여 키워드를 포함하는 첫 구간
fn find_span<'a>(
    tokens: &'a [RecognizedToken],
    keyword: &str,
    words: usize,
) -> Option<&'a [RecognizedToken]> {
    if tokens.len() < words {
        return None;
    }
    tokens.windows(words).find(|window| {
        let joined = window
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        joined.contains(keyword)
    })
}

/// 토큰 구간 합집합 박스의 로컬 중심 (박스 크기가 0이면 `None`)
fn span_bounds(span: &[RecognizedToken]) -> Option<(i32, i32)> {
    let left = span.iter().map(|t| t.left).min()?;
    let top = span.iter().map(|t| t.top).min()?;
    let right = span.iter().map(|t| t.left + t.width as i32).max()?;
    let bottom = span.iter().map(|t| t.top + t.height as i32).max()?;
    if right <= left || bottom <= top {
        return None;
    }
    if let [single] = span {
        return Some(single.local_center());
    }
    Some((left + (right - left) / 2, top + (bottom - top) / 2))
}
