//! 명령 콘솔.
//!
//! 표준 입력 한 줄을 명령 하나로 처리한다. 시작/정지 단축키 이름을 그대로
//! 입력해도 같은 동작을 한다.
//!
//! | 명령 | 동작 |
//! |------|------|
//! | `start` / 시작 단축키 | 활성 모듈 일괄 시작 |
//! | `stop` / 정지 단축키 | 모든 모듈 일괄 정지 |
//! | `pause`, `resume` | 일시정지 전환 |
//! | `status` | 모듈 상태와 최근 메시지 |
//! | `enable <모듈>`, `disable <모듈>` | 활성 모듈 변경 (설정 파일에 저장) |
//! | `quit` | 정지 후 종료 |

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use autodoor_core::config_manager::ConfigManager;
use autodoor_engine::control_panel::ControlPanel;
use autodoor_engine::orchestrator::Orchestrator;

use crate::lifecycle::ShutdownReceiver;

/// 콘솔 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    Status,
    Enable(String),
    Disable(String),
    Help,
    Quit,
}

impl Command {
    /// 입력 한 줄 해석. 빈 줄은 `Ok(None)`.
    pub fn parse(
        line: &str,
        start_hotkey: &str,
        stop_hotkey: &str,
    ) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next();

        if head.eq_ignore_ascii_case(start_hotkey) {
            return Ok(Some(Self::Start));
        }
        if head.eq_ignore_ascii_case(stop_hotkey) {
            return Ok(Some(Self::Stop));
        }

        let command = match (head.to_ascii_lowercase().as_str(), arg) {
            ("start", None) => Self::Start,
            ("stop", None) => Self::Stop,
            ("pause", None) => Self::Pause,
            ("resume", None) => Self::Resume,
            ("status", None) => Self::Status,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("enable", Some(module)) => Self::Enable(module.to_string()),
            ("disable", Some(module)) => Self::Disable(module.to_string()),
            ("enable" | "disable", None) => return Err(format!("{head}: 모듈 이름이 필요합니다")),
            _ => return Err(format!("알 수 없는 명령: {}", line.trim())),
        };
        Ok(Some(command))
    }
}

/// 명령 처리 후 다음 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 명령 콘솔
pub struct Console {
    orchestrator: Arc<Orchestrator>,
    panel: Arc<ControlPanel>,
    config: ConfigManager,
}

impl Console {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        panel: Arc<ControlPanel>,
        config: ConfigManager,
    ) -> Self {
        Self {
            orchestrator,
            panel,
            config,
        }
    }

    /// 명령 하나 실행
    pub async fn handle(&self, command: Command) -> Flow {
        match command {
            Command::Start => match self.orchestrator.start_all().await {
                Ok(report) if report.already_running => println!("이미 실행 중"),
                Ok(report) => {
                    println!("시작: {}", report.started.join(", "));
                    for (module, reason) in &report.failed {
                        println!("  실패 {module}: {reason}");
                    }
                }
                Err(e) => println!("시작 실패: {e}"),
            },
            Command::Stop => {
                let report = self.orchestrator.stop_all().await;
                if report.is_clean() {
                    println!("정지 완료");
                } else {
                    println!(
                        "정지 완료 (오류 {}, 조인 타임아웃 {}, 패닉 {})",
                        report.stop_errors.len(),
                        report.join_timeouts.len(),
                        report.panicked.len()
                    );
                }
            }
            Command::Pause => {
                self.orchestrator.set_paused(true);
                println!("일시정지");
            }
            Command::Resume => {
                self.orchestrator.set_paused(false);
                println!("재개");
            }
            Command::Status => self.print_status(),
            Command::Enable(module) => self.set_enabled(&module, true),
            Command::Disable(module) => self.set_enabled(&module, false),
            Command::Help => print_help(),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// 표준 입력을 읽어 `quit`, 입력 종료 후 종료 신호, 또는 종료 신호까지 처리
    pub async fn run(&self, mut shutdown_rx: ShutdownReceiver) {
        let config = self.config.get();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            if shutdown_rx.borrow().is_some() {
                break;
            }
            tokio::select! {
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        match Command::parse(&line, &config.start_hotkey, &config.stop_hotkey) {
                            Ok(Some(command)) => {
                                if self.handle(command).await == Flow::Quit {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(message) => println!("{message} (help로 명령 목록 확인)"),
                        }
                    }
                    Ok(None) => {
                        info!("표준 입력 종료, 종료 신호 대기");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("표준 입력 읽기 실패: {e}");
                        stdin_open = false;
                    }
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }

    fn print_status(&self) {
        println!(
            "실행: {} / 일시정지: {}",
            self.orchestrator.is_running(),
            self.orchestrator.is_paused()
        );
        for status in self.orchestrator.status() {
            println!(
                "  {:<20} {:<12} 활성={} 실행={}",
                status.name, status.label, status.enabled, status.running
            );
        }
        if let Some(entry) = self.panel.status_history().last() {
            println!("  최근: [{}] {}", entry.at.format("%H:%M:%S"), entry.message);
        }
    }

    fn set_enabled(&self, module: &str, enabled: bool) {
        let was_enabled = self
            .orchestrator
            .enabled_modules()
            .iter()
            .any(|m| m == module);
        if let Err(e) = self.orchestrator.set_enabled(module, enabled) {
            println!("{e}");
            return;
        }
        let result = self.config.update_with(|config| {
            config.enabled_modules.retain(|m| m != module);
            if enabled {
                config.enabled_modules.push(module.to_string());
            }
        });
        match result {
            Ok(_) => println!(
                "{module} {} (다음 시작부터 적용)",
                if enabled { "활성화" } else { "비활성화" }
            ),
            Err(e) => {
                // 설정이 거부되면 오케스트레이터도 이전 상태로 되돌린다
                if let Err(restore) = self.orchestrator.set_enabled(module, was_enabled) {
                    warn!(module, "활성 상태 복원 실패: {restore}");
                }
                println!("설정 저장 거부: {e}");
            }
        }
    }
}

fn print_help() {
    println!("명령: start | stop | pause | resume | status | enable <모듈> | disable <모듈> | quit");
}
