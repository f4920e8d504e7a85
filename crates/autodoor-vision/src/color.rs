//! 색상 인식 감지기.
//!
//! 영역에서 목표 색상(채널별 허용 오차)과 일치하는 픽셀 비율을 계산하고
//! 조건(`Present`/`Absent`)에 따라 트리거한다. 인식 엔진을 쓰지 않는다.

use async_trait::async_trait;
use tracing::{debug, info};

use autodoor_core::config::ColorCondition;
use autodoor_core::error::CoreError;
use autodoor_core::models::action::ActionRequest;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::region::Region;
use autodoor_core::ports::vision::{Detection, TriggerDetector};

/// 픽셀 일치 통계
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatch {
    /// 일치 픽셀 비율 (0.0 ~ 1.0)
    pub ratio: f64,
    /// 첫 번째 일치 픽셀 (로컬 좌표)
    pub first: Option<(u32, u32)>,
}

/// 색상 감지기
pub struct ColorDetector {
    region: Region,
    target: [u8; 3],
    tolerance: u8,
    min_ratio: f64,
    condition: ColorCondition,
    key: String,
    click_on_match: bool,
}

impl ColorDetector {
    /// 새 감지기 생성
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        region: Region,
        target: [u8; 3],
        tolerance: u8,
        min_ratio: f64,
        condition: ColorCondition,
        key: impl Into<String>,
        click_on_match: bool,
    ) -> Self {
        Self {
            region,
            target,
            tolerance,
            min_ratio,
            condition,
            key: key.into(),
            click_on_match,
        }
    }

    /// 프레임의 목표 색상 일치 통계
    pub fn measure(&self, frame: &Frame) -> ColorMatch {
        let total = frame.width() as u64 * frame.height() as u64;
        if total == 0 {
            return ColorMatch {
                ratio: 0.0,
                first: None,
            };
        }

        let mut matched = 0u64;
        let mut first = None;
        for (x, y, px) in frame.pixels() {
            if self.matches(px) {
                matched += 1;
                first.get_or_insert((x, y));
            }
        }

        ColorMatch {
            ratio: matched as f64 / total as f64,
            first,
        }
    }

    fn matches(&self, px: [u8; 4]) -> bool {
        self.target
            .iter()
            .zip(px.iter())
            .all(|(t, p)| t.abs_diff(*p) <= self.tolerance)
    }
}

#[async_trait]
impl TriggerDetector for ColorDetector {
    async fn detect(&mut self, frame: &Frame) -> Result<Detection, CoreError> {
        let measured = self.measure(frame);
        let present = measured.ratio >= self.min_ratio;
        debug!(ratio = measured.ratio, present, "색상 일치율");

        let triggered = match self.condition {
            ColorCondition::Present => present,
            ColorCondition::Absent => !present,
        };
        if !triggered {
            return Ok(Detection::Clear);
        }

        info!(ratio = measured.ratio, condition = ?self.condition, "색상 조건 충족");
        let position = match (self.click_on_match, self.condition, measured.first) {
            (true, ColorCondition::Present, Some((x, y))) => {
                Some(self.region.to_global(x as i32, y as i32))
            }
            _ => None,
        };
        Ok(Detection::Triggered(ActionRequest {
            position,
            key: Some(self.key.clone()),
        }))
    }

    fn name(&self) -> &str {
        "color"
    }
}
