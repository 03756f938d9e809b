//! Keybinding configuration for the reader.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub scroll_up: Vec<String>,
    pub scroll_down: Vec<String>,
    pub page_up: Vec<String>,
    pub page_down: Vec<String>,
    pub top: Vec<String>,
    pub next_chapter: Vec<String>,
    pub prev_chapter: Vec<String>,
    pub retry: Vec<String>,
    pub open_in_browser: Vec<String>,
}

fn keys(bindings: &[&str]) -> Vec<String> {
    bindings.iter().map(|s| s.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            scroll_up: keys(&["k", "Up"]),
            scroll_down: keys(&["j", "Down"]),
            page_up: keys(&["PageUp", "b"]),
            page_down: keys(&["PageDown", "Space"]),
            top: keys(&["g", "Home"]),
            next_chapter: keys(&["n", "Right"]),
            prev_chapter: keys(&["p", "Left"]),
            retry: keys(&["r"]),
            open_in_browser: keys(&["o"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event. Earlier entries win on conflicts.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table = [
            (&self.quit, Action::Quit),
            (&self.scroll_up, Action::ScrollUp),
            (&self.scroll_down, Action::ScrollDown),
            (&self.page_up, Action::PageUp),
            (&self.page_down, Action::PageDown),
            (&self.top, Action::Top),
            (&self.next_chapter, Action::NextChapter),
            (&self.prev_chapter, Action::PrevChapter),
            (&self.retry, Action::Retry),
            (&self.open_in_browser, Action::OpenInBrowser),
        ];
        table
            .into_iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map_or(Action::None, |(_, action)| action)
    }

    /// Short `key:Label` hint built from the first binding of an action.
    /// Actions left unbound give no hint.
    pub fn hint(bindings: &[String], label: &str) -> Option<String> {
        bindings.first().map(|key| format!("{}:{}", key, label))
    }

    /// Bindings that fail to parse, as `(binding, reason)`.
    pub fn invalid_bindings(&self) -> Vec<(String, String)> {
        [
            &self.quit,
            &self.scroll_up,
            &self.scroll_down,
            &self.page_up,
            &self.page_down,
            &self.top,
            &self.next_chapter,
            &self.prev_chapter,
            &self.retry,
            &self.open_in_browser,
        ]
        .into_iter()
        .flatten()
        .filter_map(|b| parse_key_string(b).err().map(|e| (b.clone(), e)))
        .collect()
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored unless the binding asks for it, since terminals
    /// report it inconsistently for uppercase characters.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse strings like `"j"`, `"PageDown"` or `"Ctrl+Shift+a"`.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // a lone "+" is the plus key, not a separator
    let (mods, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) if !key.is_empty() => (Some(mods), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in mods.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}
