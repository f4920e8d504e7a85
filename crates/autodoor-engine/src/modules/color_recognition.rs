//! 색상 인식 모듈: 목표 색상의 출현/소멸에 반응.

use autodoor_core::config::{secs, AppConfig, MODULE_COLOR_RECOGNITION};
use autodoor_core::ports::vision::TriggerDetector;
use autodoor_vision::color::ColorDetector;

use super::{DetectorModule, ModuleDeps};
use crate::trigger_loop::LoopSettings;

/// 표시 이름
pub const LABEL: &str = "색상 인식";

/// 설정에서 색상 인식 모듈 생성
pub fn build(config: &AppConfig, deps: &ModuleDeps) -> DetectorModule {
    let color = config.color.clone();
    let settings = LoopSettings {
        region: color.region,
        poll_interval: secs(color.poll_interval_secs),
        cooldown: secs(color.cooldown_secs),
        error_backoff: config.error_backoff(),
    };

    DetectorModule::new(
        MODULE_COLOR_RECOGNITION,
        LABEL,
        settings,
        deps,
        Box::new(move || -> Box<dyn TriggerDetector> {
            Box::new(ColorDetector::new(
                color.region,
                color.target_rgb,
                color.tolerance,
                color.min_match_ratio,
                color.condition,
                color.key.clone(),
                color.click_on_match,
            ))
        }),
    )
}
