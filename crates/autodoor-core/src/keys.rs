//! 키 이름 파싱.
//!
//! 설정 검증과 입력 주입 어댑터가 같은 키 이름 규칙을 공유한다.
//! 대소문자를 구분하지 않으며, 단일 문자는 그대로 유니코드 키가 된다.

/// 인식 가능한 키
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Return,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Control,
    Shift,
    Alt,
    Meta,
    CapsLock,
    /// F1 ~ F12
    Function(u8),
    /// 단일 문자 키
    Char(char),
}

impl KeyName {
    /// 문자열 → 키 (인식 불가 시 `None`)
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let lower = trimmed.to_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => Self::Return,
            "tab" => Self::Tab,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "space" => Self::Space,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "up" | "uparrow" => Self::Up,
            "down" | "downarrow" => Self::Down,
            "left" | "leftarrow" => Self::Left,
            "right" | "rightarrow" => Self::Right,
            "ctrl" | "control" => Self::Control,
            "shift" => Self::Shift,
            "alt" | "option" => Self::Alt,
            "meta" | "command" | "cmd" | "super" | "win" => Self::Meta,
            "capslock" => Self::CapsLock,
            other => {
                if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        return Some(Self::Function(n));
                    }
                    return None;
                }
                let mut chars = trimmed.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::Char(ch.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// 인식 가능한 키 이름인지
pub fn is_recognized_key(name: &str) -> bool {
    KeyName::parse(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys() {
        assert_eq!(KeyName::parse("Enter"), Some(KeyName::Return));
        assert_eq!(KeyName::parse("ESC"), Some(KeyName::Escape));
        assert_eq!(KeyName::parse("command"), Some(KeyName::Meta));
        assert_eq!(KeyName::parse("F12"), Some(KeyName::Function(12)));
    }

    #[test]
    fn single_chars() {
        assert_eq!(KeyName::parse("e"), Some(KeyName::Char('e')));
        assert_eq!(KeyName::parse("E"), Some(KeyName::Char('e')));
        assert_eq!(KeyName::parse("1"), Some(KeyName::Char('1')));
    }

    #[test]
    fn unknown_keys() {
        assert!(!is_recognized_key(""));
        assert!(!is_recognized_key("f13"));
        assert!(!is_recognized_key("hyperkey"));
    }
}
