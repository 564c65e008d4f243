//! Keyboard-driven editing on top of an [`Outline`].

use std::str::FromStr;

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::outline::Outline;

/// Keys the editors react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    ShiftTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Key {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enter" | "ret" => Ok(Key::Enter),
            "tab" => Ok(Key::Tab),
            "shift-tab" | "s-tab" | "backtab" => Ok(Key::ShiftTab),
            "backspace" | "bs" => Ok(Key::Backspace),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            _ => Err(DomainError::UnknownKey(s.to_string())),
        }
    }
}

/// Focus-tracking editor for the outline.
///
/// Enter inserts a sibling after the focused item and focuses it, Tab and
/// Shift+Tab indent and outdent, Backspace on an empty title deletes the item
/// and moves focus to the previous one. Up and Down move focus.
#[derive(Debug, Clone)]
pub struct OutlineEditor {
    outline: Outline,
    focus: Option<String>,
}

impl OutlineEditor {
    /// Start editing with focus on the first item, if any.
    pub fn new(outline: Outline) -> Self {
        let focus = outline.items().first().map(|i| i.id.clone());
        Self { outline, focus }
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn into_outline(self) -> Outline {
        self.outline
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Focus an item. Unknown ids leave focus unchanged.
    pub fn set_focus(&mut self, id: &str) -> bool {
        if self.outline.get(id).is_some() {
            self.focus = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Replace the focused item's title (typing into its field).
    pub fn type_title(&mut self, title: &str) {
        let Some(pos) = self
            .focus
            .as_deref()
            .and_then(|id| self.outline.position(id))
        else {
            return;
        };
        self.outline.items_mut()[pos].title = title.to_string();
    }

    /// Handle a key press and return the id that has focus afterwards.
    pub fn handle_key(&mut self, key: Key) -> Option<&str> {
        let Some(focused) = self.focus.clone() else {
            if key == Key::Enter {
                self.focus = Some(self.outline.add_row(""));
            }
            return self.focus();
        };

        match key {
            Key::Enter => {
                if let Some(new_id) = self.outline.add_sibling(&focused) {
                    self.focus = Some(new_id);
                }
            }
            Key::Tab => {
                self.outline.indent(&focused);
            }
            Key::ShiftTab => {
                self.outline.outdent(&focused);
            }
            Key::Backspace => self.delete_if_empty(&focused),
            Key::Up => self.move_focus(&focused, -1),
            Key::Down => self.move_focus(&focused, 1),
            Key::Left | Key::Right => {}
        }
        debug!("key {:?}: focus={:?}", key, self.focus);
        self.focus()
    }

    fn delete_if_empty(&mut self, id: &str) {
        let Some(pos) = self.outline.position(id) else {
            return;
        };
        if !self.outline.items()[pos].title.is_empty() {
            return;
        }
        self.outline.remove(id);
        self.focus = self
            .outline
            .items()
            .get(pos.saturating_sub(1))
            .map(|i| i.id.clone());
    }

    fn move_focus(&mut self, id: &str, delta: isize) {
        let Some(pos) = self.outline.position(id) else {
            return;
        };
        let target = pos.checked_add_signed(delta).unwrap_or(0);
        if let Some(item) = self.outline.items().get(target) {
            self.focus = Some(item.id.clone());
        }
    }
}
