#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    R,
    S,
    T,
    M,
    /// `1`..=`9` and `0` on the top row or keypad.
    Digit(u8),
    Other,
}

impl KeyCode {
    /// Case-insensitive mapping from a typed character.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_lowercase() {
            'r' => KeyCode::R,
            's' => KeyCode::S,
            't' => KeyCode::T,
            'm' => KeyCode::M,
            d @ '0'..='9' => KeyCode::Digit(d as u8 - b'0'),
            _ => KeyCode::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }
}

/// Everything the keyboard and the on-screen buttons can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterAction {
    Regenerate,
    Save,
    /// Zero-based palette index.
    SelectPalette(usize),
    EditText,
    ToggleBlend,
    /// Toolbar only; no key is bound.
    ToggleStyle,
}

pub const PALETTE_KEYS: u8 = 8;

/// Keys are ignored while inactive (e.g. a text prompt has focus) and when
/// Ctrl is held, so platform shortcuts pass through.
pub fn map_key_event(active: bool, event: KeyEvent) -> Option<PosterAction> {
    if !active || event.modifiers.ctrl {
        return None;
    }
    match event.key {
        KeyCode::R => Some(PosterAction::Regenerate),
        KeyCode::S => Some(PosterAction::Save),
        KeyCode::T => Some(PosterAction::EditText),
        KeyCode::M => Some(PosterAction::ToggleBlend),
        KeyCode::Digit(d) if (1..=PALETTE_KEYS).contains(&d) => {
            Some(PosterAction::SelectPalette(usize::from(d - 1)))
        }
        KeyCode::Digit(_) | KeyCode::Other => None,
    }
}
