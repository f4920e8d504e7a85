//! 컨트롤 표면 포트.
//!
//! 모듈 인디케이터, 컨트롤 활성/비활성, 시작/정지 큐, 상태 메시지를 표시하는
//! UI 계층의 최소 인터페이스. 레이아웃과 스타일은 다루지 않는다.

use std::collections::HashSet;

/// 모듈 인디케이터 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// 실행 중
    Active,
    /// 정지
    Inactive,
}

/// 시작/정지 시 재생하는 시청각 큐
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Start,
    Stop,
}

/// 일괄 비활성화에서 제외되는 컨트롤 ID 집합
///
/// 시작/정지 컨트롤이 비활성화되면 다시 제어할 방법이 없어지므로
/// 반드시 여기에 포함되어야 한다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedControls {
    ids: HashSet<String>,
}

impl ProtectedControls {
    /// ID 목록으로 생성
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// ID 추가
    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// 보호 대상인지
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// 보호 ID 수
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 비어 있는지
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// 일시적 상태 메시지 수신자
pub trait StatusSink: Send + Sync {
    /// 상태 메시지 게시
    fn publish_status(&self, message: &str);
}

/// 컨트롤 표면: 인디케이터/컨트롤/큐
pub trait ControlSurface: StatusSink {
    /// 모듈 인디케이터 갱신
    fn set_indicator(&self, module: &str, state: IndicatorState);

    /// 보호 집합과 인디케이터를 제외한 모든 컨트롤 활성/비활성
    fn set_controls_enabled(&self, enabled: bool, protected: &ProtectedControls);

    /// 시작/정지 큐 재생
    fn play_cue(&self, cue: Cue);
}
