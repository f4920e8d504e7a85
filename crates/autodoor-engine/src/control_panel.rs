//! 헤드리스 컨트롤 패널.
//!
//! `ControlSurface` 포트 구현. 위젯 트리(그룹/버튼/입력/인디케이터),
//! 모듈별 인디케이터, 마지막 큐, 시각이 붙은 상태 메시지 기록을 보관한다.
//! 일괄 활성/비활성은 트리 전체를 재귀로 돌며 보호 집합과 인디케이터를
//! 건너뛴다.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::{debug, info};

use autodoor_core::ports::control_surface::{
    ControlSurface, Cue, IndicatorState, ProtectedControls, StatusSink,
};

/// 시작 버튼 ID
pub const START_BUTTON: &str = "start_button";
/// 정지 버튼 ID
pub const STOP_BUTTON: &str = "stop_button";

/// 상태 기록 최대 보관 수
const STATUS_HISTORY_LIMIT: usize = 100;

/// 위젯 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Group,
    Button,
    Input,
    Indicator,
}

/// 위젯 트리 노드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    pub enabled: bool,
    pub children: Vec<Widget>,
}

impl Widget {
    /// 자식 없는 위젯
    pub fn leaf(id: impl Into<String>, kind: WidgetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: true,
            children: Vec::new(),
        }
    }

    /// 그룹 위젯
    pub fn group(id: impl Into<String>, children: Vec<Widget>) -> Self {
        Self {
            id: id.into(),
            kind: WidgetKind::Group,
            enabled: true,
            children,
        }
    }

    fn find(&self, id: &str) -> Option<&Widget> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn set_enabled_recursive(&mut self, enabled: bool, protected: &ProtectedControls) -> usize {
        let mut changed = 0;
        if self.kind != WidgetKind::Indicator
            && !protected.contains(&self.id)
            && self.enabled != enabled
        {
            self.enabled = enabled;
            changed += 1;
        }
        for child in &mut self.children {
            changed += child.set_enabled_recursive(enabled, protected);
        }
        changed
    }

    fn collect_indicators<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.kind == WidgetKind::Indicator {
            out.push(&self.id);
        }
        for child in &self.children {
            child.collect_indicators(out);
        }
    }
}

/// 상태 메시지 기록 항목
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

struct PanelState {
    root: Widget,
    indicators: BTreeMap<String, IndicatorState>,
    last_cue: Option<Cue>,
    history: VecDeque<StatusEntry>,
}

/// 헤드리스 컨트롤 패널
pub struct ControlPanel {
    state: Mutex<PanelState>,
}

impl ControlPanel {
    /// 임의 위젯 트리로 생성
    pub fn new(root: Widget) -> Self {
        Self {
            state: Mutex::new(PanelState {
                root,
                indicators: BTreeMap::new(),
                last_cue: None,
                history: VecDeque::new(),
            }),
        }
    }

    /// 기본 레이아웃: 시작/정지/일시정지 버튼, 설정 입력, 모듈별 토글과 인디케이터
    pub fn standard<'a>(modules: impl IntoIterator<Item = &'a str>) -> Self {
        let module_rows = modules
            .into_iter()
            .map(|name| {
                Widget::group(
                    format!("module.{name}"),
                    vec![
                        Widget::leaf(format!("module.{name}.enabled"), WidgetKind::Input),
                        Widget::leaf(indicator_id(name), WidgetKind::Indicator),
                    ],
                )
            })
            .collect();

        let root = Widget::group(
            "root",
            vec![
                Widget::group(
                    "controls",
                    vec![
                        Widget::leaf(START_BUTTON, WidgetKind::Button),
                        Widget::leaf(STOP_BUTTON, WidgetKind::Button),
                        Widget::leaf("pause_button", WidgetKind::Button),
                    ],
                ),
                Widget::group(
                    "settings",
                    vec![
                        Widget::leaf("region.x", WidgetKind::Input),
                        Widget::leaf("region.y", WidgetKind::Input),
                        Widget::leaf("region.width", WidgetKind::Input),
                        Widget::leaf("region.height", WidgetKind::Input),
                        Widget::leaf("trigger_keywords", WidgetKind::Input),
                        Widget::leaf("trigger_key", WidgetKind::Input),
                        Widget::leaf("poll_interval", WidgetKind::Input),
                        Widget::leaf("action_cooldown", WidgetKind::Input),
                        Widget::leaf("save_settings", WidgetKind::Button),
                    ],
                ),
                Widget::group("modules", module_rows),
            ],
        );
        Self::new(root)
    }

    /// 시작/정지 컨트롤 보호 집합
    pub fn default_protected() -> ProtectedControls {
        ProtectedControls::new([START_BUTTON, STOP_BUTTON])
    }

    /// 위젯 활성 상태 (없는 ID면 `None`)
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.state.lock().root.find(id).map(|w| w.enabled)
    }

    /// 트리의 모든 인디케이터 ID
    pub fn indicator_ids(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut ids = Vec::new();
        state.root.collect_indicators(&mut ids);
        ids.into_iter().map(str::to_string).collect()
    }

    /// 모듈 인디케이터 상태 (갱신된 적 없으면 `Inactive`)
    pub fn indicator(&self, module: &str) -> IndicatorState {
        self.state
            .lock()
            .indicators
            .get(module)
            .copied()
            .unwrap_or(IndicatorState::Inactive)
    }

    /// 마지막으로 재생한 큐
    pub fn last_cue(&self) -> Option<Cue> {
        self.state.lock().last_cue
    }

    /// 가장 최근 상태 메시지
    pub fn latest_status(&self) -> Option<String> {
        self.state.lock().history.back().map(|e| e.message.clone())
    }

    /// 상태 메시지 기록 (오래된 순)
    pub fn status_history(&self) -> Vec<StatusEntry> {
        self.state.lock().history.iter().cloned().collect()
    }
}

/// 모듈 인디케이터 위젯 ID
pub fn indicator_id(module: &str) -> String {
    format!("indicator.{module}")
}

impl StatusSink for ControlPanel {
    fn publish_status(&self, message: &str) {
        debug!(status = %message, "상태 갱신");
        let mut state = self.state.lock();
        if state.history.len() == STATUS_HISTORY_LIMIT {
            state.history.pop_front();
        }
        state.history.push_back(StatusEntry {
            at: Local::now(),
            message: message.to_string(),
        });
    }
}

impl ControlSurface for ControlPanel {
    fn set_indicator(&self, module: &str, indicator: IndicatorState) {
        self.state
            .lock()
            .indicators
            .insert(module.to_string(), indicator);
    }

    fn set_controls_enabled(&self, enabled: bool, protected: &ProtectedControls) {
        let changed = self
            .state
            .lock()
            .root
            .set_enabled_recursive(enabled, protected);
        debug!(enabled, changed, "컨트롤 일괄 전환");
    }

    fn play_cue(&self, cue: Cue) {
        info!(?cue, "큐 재생");
        self.state.lock().last_cue = Some(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_skips_protected_and_indicators() {
        let panel = ControlPanel::standard(["ocr_trigger", "timed_task"]);
        panel.set_controls_enabled(false, &ControlPanel::default_protected());

        assert_eq!(panel.is_enabled(START_BUTTON), Some(true));
        assert_eq!(panel.is_enabled(STOP_BUTTON), Some(true));
        assert_eq!(panel.is_enabled("indicator.ocr_trigger"), Some(true));
        assert_eq!(panel.is_enabled("pause_button"), Some(false));
        assert_eq!(panel.is_enabled("region.width"), Some(false));
        assert_eq!(panel.is_enabled("module.timed_task.enabled"), Some(false));
        assert_eq!(panel.is_enabled("missing"), None);

        panel.set_controls_enabled(true, &ControlPanel::default_protected());
        assert_eq!(panel.is_enabled("region.width"), Some(true));
    }

    #[test]
    fn indicators_default_inactive() {
        let panel = ControlPanel::standard(["ocr_trigger"]);
        assert_eq!(panel.indicator("ocr_trigger"), IndicatorState::Inactive);
        panel.set_indicator("ocr_trigger", IndicatorState::Active);
        assert_eq!(panel.indicator("ocr_trigger"), IndicatorState::Active);
        assert_eq!(panel.indicator_ids(), vec!["indicator.ocr_trigger".to_string()]);
    }

    #[test]
    fn status_history_is_bounded() {
        let panel = ControlPanel::standard([]);
        for i in 0..(STATUS_HISTORY_LIMIT + 5) {
            panel.publish_status(&format!("msg {i}"));
        }
        let history = panel.status_history();
        assert_eq!(history.len(), STATUS_HISTORY_LIMIT);
        assert_eq!(history[0].message, "msg 5");
        assert_eq!(panel.latest_status().as_deref(), Some("msg 104"));
    }

    #[test]
    fn cue_is_recorded() {
        let panel = ControlPanel::standard([]);
        assert_eq!(panel.last_cue(), None);
        panel.play_cue(Cue::Stop);
        assert_eq!(panel.last_cue(), Some(Cue::Stop));
    }
}
