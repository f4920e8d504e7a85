//! OCR 트리거 모듈: 영역에서 키워드를 찾으면 클릭 후 키 입력.

use autodoor_core::config::{AppConfig, MODULE_OCR_TRIGGER};
use autodoor_core::ports::vision::TriggerDetector;
use autodoor_vision::trigger::KeywordDetector;

use super::{DetectorModule, ModuleDeps};
use crate::trigger_loop::LoopSettings;

/// 표시 이름
pub const LABEL: &str = "OCR 트리거";

/// 설정에서 OCR 트리거 모듈 생성
pub fn build(config: &AppConfig, deps: &ModuleDeps) -> DetectorModule {
    let settings = LoopSettings {
        region: config.region,
        poll_interval: config.poll_interval(),
        cooldown: config.action_cooldown(),
        error_backoff: config.error_backoff(),
    };
    let engine = deps.engine.clone();
    let region = config.region;
    let keywords = config.trigger_keywords.clone();
    let trigger_key = config.trigger_key.clone();

    DetectorModule::new(
        MODULE_OCR_TRIGGER,
        LABEL,
        settings,
        deps,
        Box::new(move || -> Box<dyn TriggerDetector> {
            Box::new(KeywordDetector::new(
                engine.clone(),
                region,
                &keywords,
                trigger_key.clone(),
            ))
        }),
    )
}
