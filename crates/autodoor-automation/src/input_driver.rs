//! 입력 주입기 구현.
//!
//! `NoOpInputInjector` (드라이런/테스트용)와 `EnigoInputInjector` (실제 입력)를 제공한다.

use async_trait::async_trait;
use tracing::debug;

use autodoor_core::error::CoreError;
use autodoor_core::ports::input_injector::InputInjector;

// ============================================================
// NoOpInputInjector: 드라이런/디버깅용
// ============================================================

/// No-Op 입력 주입기: 모든 입력을 로깅만 하고 실행하지 않음
pub struct NoOpInputInjector;

#[async_trait]
impl InputInjector for NoOpInputInjector {
    async fn move_and_click(&self, x: i32, y: i32) -> Result<(), CoreError> {
        debug!(x, y, "[NoOp] 이동+클릭");
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), CoreError> {
        debug!(key, "[NoOp] 키 입력");
        Ok(())
    }

    fn platform(&self) -> &str {
        "noop"
    }
}

// ============================================================
// EnigoInputInjector: 실제 마우스/키보드 입력
// ============================================================

/// 실제 마우스/키보드 입력 주입기 (enigo 기반)
///
/// macOS: Accessibility 권한 필요
/// Windows: UIAccess 또는 관리자 권한 필요
/// Linux: X11 또는 Wayland + uinput 권한 필요
#[cfg(feature = "enigo")]
pub struct EnigoInputInjector {
    /// enigo 인스턴스 (Send지만 !Sync → tokio::sync::Mutex 사용)
    enigo: tokio::sync::Mutex<enigo::Enigo>,
}

#[cfg(feature = "enigo")]
impl EnigoInputInjector {
    /// 새 EnigoInputInjector 생성
    pub fn new() -> Result<Self, CoreError> {
        let settings = enigo::Settings::default();
        let enigo = enigo::Enigo::new(&settings)
            .map_err(|e| CoreError::Injection(format!("입력 드라이버 초기화 실패: {e}")))?;
        Ok(Self {
            enigo: tokio::sync::Mutex::new(enigo),
        })
    }

    /// 키 이름 → enigo 키 매핑
    fn map_key(key: &str) -> Result<enigo::Key, CoreError> {
        use autodoor_core::keys::KeyName;

        let name = KeyName::parse(key)
            .ok_or_else(|| CoreError::Injection(format!("알 수 없는 키: {key}")))?;
        Ok(match name {
            KeyName::Return => enigo::Key::Return,
            KeyName::Tab => enigo::Key::Tab,
            KeyName::Escape => enigo::Key::Escape,
            KeyName::Backspace => enigo::Key::Backspace,
            KeyName::Delete => enigo::Key::Delete,
            KeyName::Space => enigo::Key::Space,
            KeyName::Home => enigo::Key::Home,
            KeyName::End => enigo::Key::End,
            KeyName::PageUp => enigo::Key::PageUp,
            KeyName::PageDown => enigo::Key::PageDown,
            KeyName::Up => enigo::Key::UpArrow,
            KeyName::Down => enigo::Key::DownArrow,
            KeyName::Left => enigo::Key::LeftArrow,
            KeyName::Right => enigo::Key::RightArrow,
            KeyName::Control => enigo::Key::Control,
            KeyName::Shift => enigo::Key::Shift,
            KeyName::Alt => enigo::Key::Alt,
            KeyName::Meta => enigo::Key::Meta,
            KeyName::CapsLock => enigo::Key::CapsLock,
            KeyName::Function(1) => enigo::Key::F1,
            KeyName::Function(2) => enigo::Key::F2,
            KeyName::Function(3) => enigo::Key::F3,
            KeyName::Function(4) => enigo::Key::F4,
            KeyName::Function(5) => enigo::Key::F5,
            KeyName::Function(6) => enigo::Key::F6,
            KeyName::Function(7) => enigo::Key::F7,
            KeyName::Function(8) => enigo::Key::F8,
            KeyName::Function(9) => enigo::Key::F9,
            KeyName::Function(10) => enigo::Key::F10,
            KeyName::Function(11) => enigo::Key::F11,
            KeyName::Function(_) => enigo::Key::F12,
            KeyName::Char(ch) => enigo::Key::Unicode(ch),
        })
    }
}

#[cfg(feature = "enigo")]
#[async_trait]
impl InputInjector for EnigoInputInjector {
    async fn move_and_click(&self, x: i32, y: i32) -> Result<(), CoreError> {
        use enigo::Mouse;
        debug!(x, y, "[Enigo] 이동+클릭");
        let mut enigo = self.enigo.lock().await;
        enigo
            .move_mouse(x, y, enigo::Coordinate::Abs)
            .map_err(|e| CoreError::Injection(format!("마우스 이동 실패: {e}")))?;
        enigo
            .button(enigo::Button::Left, enigo::Direction::Click)
            .map_err(|e| CoreError::Injection(format!("마우스 클릭 실패: {e}")))?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), CoreError> {
        use enigo::Keyboard;
        debug!(key, "[Enigo] 키 입력");
        let mapped = Self::map_key(key)?;
        let mut enigo = self.enigo.lock().await;
        enigo
            .key(mapped, enigo::Direction::Click)
            .map_err(|e| CoreError::Injection(format!("키 입력 실패: {e}")))?;
        Ok(())
    }

    fn platform(&self) -> &str {
        #[cfg(target_os = "macos")]
        {
            "macos"
        }
        #[cfg(target_os = "windows")]
        {
            "windows"
        }
        #[cfg(target_os = "linux")]
        {
            "linux"
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            "unknown"
        }
    }
}

/// 플랫폼별 입력 주입기 생성 팩토리
///
/// `enigo` feature 활성화 + `dry_run == false`이면 실제 입력 주입기,
/// 그 외(또는 초기화 실패)에는 NoOp 주입기를 반환한다.
pub fn create_platform_injector(dry_run: bool) -> Box<dyn InputInjector> {
    #[cfg(feature = "enigo")]
    {
        if !dry_run {
            match EnigoInputInjector::new() {
                Ok(injector) => {
                    tracing::info!("실제 입력 주입기 (enigo) 초기화 완료");
                    return Box::new(injector);
                }
                Err(e) => {
                    tracing::warn!("enigo 초기화 실패, NoOp 폴백: {e}");
                }
            }
        }
    }
    #[cfg(not(feature = "enigo"))]
    {
        if !dry_run {
            tracing::warn!("enigo feature 비활성화: NoOp 입력 주입기 사용");
        }
    }
    Box::new(NoOpInputInjector)
}

// ============================================================
// 테스트
// ============================================================
