//! 트리거 시나리오 통합 테스트.
//!
//! 설정 → 레지스트리 → 오케스트레이터 → OCR 트리거 루프 → 스로틀러 → 주입기.

mod common;

use std::sync::Arc;
use std::time::Duration;

use autodoor_core::config::{AppConfig, TimedTask, MODULE_OCR_TRIGGER, MODULE_TIMED_TASK};
use autodoor_core::models::region::Region;
use autodoor_engine::control_panel::ControlPanel;
use autodoor_engine::modules::standard_registry;
use autodoor_engine::orchestrator::Orchestrator;

use common::{harness, token, Harness, Op};

fn door_config() -> AppConfig {
    AppConfig {
        region: Region::new(0, 0, 800, 600),
        trigger_keywords: vec!["door".to_string()],
        trigger_key: Some("e".to_string()),
        poll_interval_secs: 1.0,
        action_cooldown_secs: 180.0,
        enabled_modules: vec![MODULE_OCR_TRIGGER.to_string()],
        ..AppConfig::default_config()
    }
}

fn orchestrator(config: &AppConfig, h: &Harness) -> (Orchestrator, Arc<ControlPanel>) {
    let registry = standard_registry(config, &h.deps).unwrap();
    let panel = Arc::new(ControlPanel::standard(
        registry.names().iter().map(String::as_str).collect::<Vec<_>>(),
    ));
    let orchestrator = Orchestrator::new(
        registry,
        h.deps.run_state.clone(),
        panel.clone(),
        ControlPanel::default_protected(),
        config.join_timeout(),
    )
    .with_enabled(&config.enabled_modules)
    .unwrap();
    (orchestrator, panel)
}

#[tokio::test(start_paused = true)]
async fn door_dispatches_then_respects_cooldown() {
    let h = harness(vec![token("Door", 10, 20, 40, 15)]);
    let config = door_config();
    let (orchestrator, _panel) = orchestrator(&config, &h);

    orchestrator.start_all().await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    let clicks = h.injector.clicks();
    assert_eq!(clicks.len(), 1, "쿨다운 중에는 한 번만 디스패치");
    assert_eq!(clicks[0].1, Op::Click(30, 27));
    let keys = h.injector.keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].1, Op::Key("e".to_string()));
    assert!(keys[0].0 - clicks[0].0 >= Duration::from_millis(500));

    tokio::time::sleep(Duration::from_secs(125)).await;
    let clicks = h.injector.clicks();
    assert_eq!(clicks.len(), 2);
    assert_eq!(clicks[1].1, Op::Click(30, 27));
    // 두 번째 디스패치는 첫 디스패치 완료 후 180초 이상 지나서 시작
    assert!(clicks[1].0 - keys[0].0 >= Duration::from_secs(180));

    let report = orchestrator.stop_all().await;
    assert!(report.is_clean(), "{report:?}");
}

#[tokio::test(start_paused = true)]
async fn static_screen_is_recognized_once() {
    let h = harness(vec![token("window", 0, 0, 30, 10)]);
    let config = door_config();
    let (orchestrator, _panel) = orchestrator(&config, &h);

    orchestrator.start_all().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    orchestrator.stop_all().await;

    assert!(h.screen.captures.get() >= 10);
    assert_eq!(h.engine.calls.get(), 1);
    assert!(h.injector.ops.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn changed_text_on_identical_frame_is_not_rechecked() {
    let h = harness(vec![token("hall", 0, 0, 30, 10)]);
    let config = AppConfig {
        region: Region::new(100, 50, 400, 300),
        ..door_config()
    };
    let (orchestrator, _panel) = orchestrator(&config, &h);
    orchestrator.start_all().await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(h.injector.ops.lock().is_empty());

    // 프레임이 같으면 인식 결과가 바뀌어도 다시 인식하지 않는다
    h.engine.set_tokens(vec![token("door", 10, 20, 40, 15)]);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(h.injector.ops.lock().is_empty());

    orchestrator.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn shared_throttler_orders_all_modules() {
    let h = harness(vec![token("door", 10, 20, 40, 15)]);
    let mut config = door_config();
    config.action_cooldown_secs = 0.0;
    config.enabled_modules = vec![
        MODULE_OCR_TRIGGER.to_string(),
        MODULE_TIMED_TASK.to_string(),
    ];
    config.timed.tasks = vec![TimedTask {
        key: "space".to_string(),
        interval_secs: 1.0,
    }];
    let (orchestrator, _panel) = orchestrator(&config, &h);

    orchestrator.start_all().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    orchestrator.stop_all().await;

    let ops = h.injector.ops.lock().clone();
    assert!(ops.iter().any(|(_, op)| *op == Op::Key("space".to_string())));
    assert!(ops.iter().any(|(_, op)| *op == Op::Click(30, 27)));
    for pair in ops.windows(2) {
        assert!(
            pair[1].0 - pair[0].0 >= Duration::from_millis(500),
            "물리 입력 간격은 operation_interval 이상"
        );
    }
}
