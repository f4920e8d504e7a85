//! 통합 테스트 공용 목 포트.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use autodoor_automation::throttler::ActionThrottler;
use autodoor_core::error::CoreError;
use autodoor_core::models::frame::Frame;
use autodoor_core::models::region::Region;
use autodoor_core::models::token::RecognizedToken;
use autodoor_core::ports::frame_source::FrameSource;
use autodoor_core::ports::input_injector::InputInjector;
use autodoor_core::ports::recognition::RecognitionEngine;
use autodoor_core::state::{AtomicCell, RunState};
use autodoor_engine::modules::ModuleDeps;

/// 항상 같은 프레임을 돌려주는 소스
pub struct StillScreen {
    frame: Frame,
    pub captures: AtomicCell<u32>,
}

impl StillScreen {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frame: Frame::filled(16, 16, [40, 40, 40, 255]),
            captures: AtomicCell::new(0),
        })
    }
}

#[async_trait]
impl FrameSource for StillScreen {
    async fn capture(&self, _region: &Region) -> Result<Frame, CoreError> {
        self.captures.increment(1);
        Ok(self.frame.clone())
    }
}

/// 고정 토큰을 돌려주는 인식 엔진
pub struct ScriptedEngine {
    tokens: Mutex<Vec<RecognizedToken>>,
    pub calls: AtomicCell<u32>,
}

impl ScriptedEngine {
    pub fn new(tokens: Vec<RecognizedToken>) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(tokens),
            calls: AtomicCell::new(0),
        })
    }

    pub fn set_tokens(&self, tokens: Vec<RecognizedToken>) {
        *self.tokens.lock() = tokens;
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    async fn recognize_text(&self, _frame: &Frame) -> Result<String, CoreError> {
        self.calls.increment(1);
        Ok(self
            .tokens
            .lock()
            .iter()
            .map(|t| t.text.clone())
            .collect::<Vec<_>>()
            .join(" "))
    }

    async fn recognize_tokens(&self, _frame: &Frame) -> Result<Vec<RecognizedToken>, CoreError> {
        self.calls.increment(1);
        Ok(self.tokens.lock().clone())
    }

    fn engine_name(&self) -> &str {
        "scripted"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Click(i32, i32),
    Key(String),
}

/// 입력을 시각과 함께 기록하는 주입기
#[derive(Default)]
pub struct RecordingInjector {
    pub ops: Mutex<Vec<(Instant, Op)>>,
}

impl RecordingInjector {
    pub fn clicks(&self) -> Vec<(Instant, Op)> {
        self.ops
            .lock()
            .iter()
            .filter(|(_, op)| matches!(op, Op::Click(..)))
            .cloned()
            .collect()
    }

    pub fn keys(&self) -> Vec<(Instant, Op)> {
        self.ops
            .lock()
            .iter()
            .filter(|(_, op)| matches!(op, Op::Key(_)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InputInjector for RecordingInjector {
    async fn move_and_click(&self, x: i32, y: i32) -> Result<(), CoreError> {
        self.ops.lock().push((Instant::now(), Op::Click(x, y)));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), CoreError> {
        self.ops.lock().push((Instant::now(), Op::Key(key.to_string())));
        Ok(())
    }

    fn platform(&self) -> &str {
        "recording"
    }
}

pub fn token(text: &str, left: i32, top: i32, width: u32, height: u32) -> RecognizedToken {
    RecognizedToken {
        text: text.to_string(),
        left,
        top,
        width,
        height,
    }
}

pub struct Harness {
    pub deps: ModuleDeps,
    pub screen: Arc<StillScreen>,
    pub engine: Arc<ScriptedEngine>,
    pub injector: Arc<RecordingInjector>,
}

pub fn harness(tokens: Vec<RecognizedToken>) -> Harness {
    let screen = StillScreen::new();
    let engine = ScriptedEngine::new(tokens);
    let injector = Arc::new(RecordingInjector::default());
    let deps = ModuleDeps {
        run_state: Arc::new(RunState::new()),
        source: screen.clone(),
        engine: engine.clone(),
        throttler: Arc::new(ActionThrottler::new(
            injector.clone(),
            Duration::from_millis(500),
        )),
    };
    Harness {
        deps,
        screen,
        engine,
        injector,
    }
}
