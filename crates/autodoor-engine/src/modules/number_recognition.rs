//! 숫자 인식 모듈: 영역의 숫자가 임계값을 넘나들면 키 입력.

use autodoor_core::config::{secs, AppConfig, MODULE_NUMBER_RECOGNITION};
use autodoor_core::ports::vision::TriggerDetector;
use autodoor_vision::number::NumberDetector;

use super::{DetectorModule, ModuleDeps};
use crate::trigger_loop::LoopSettings;

/// 표시 이름
pub const LABEL: &str = "숫자 인식";

/// 설정에서 숫자 인식 모듈 생성
pub fn build(config: &AppConfig, deps: &ModuleDeps) -> DetectorModule {
    let number = &config.number;
    let settings = LoopSettings {
        region: number.region,
        poll_interval: secs(number.poll_interval_secs),
        cooldown: secs(number.cooldown_secs),
        error_backoff: config.error_backoff(),
    };
    let engine = deps.engine.clone();
    let threshold = number.threshold;
    let comparison = number.comparison;
    let key = number.key.clone();

    DetectorModule::new(
        MODULE_NUMBER_RECOGNITION,
        LABEL,
        settings,
        deps,
        Box::new(move || -> Box<dyn TriggerDetector> {
            Box::new(NumberDetector::new(
                engine.clone(),
                threshold,
                comparison,
                key.clone(),
            ))
        }),
    )
}
