use std::sync::Arc;

use crate::core::{ApplyError, Editor};
use crate::plugin::KeyHandler;
use crate::transforms::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Backspace,
    Enter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS. Either one counts.
    pub fn platform(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(ch: char) -> Self {
        Self::new(Key::Char(ch), Modifiers::default())
    }

    pub fn space() -> Self {
        Self::new(Key::Space, Modifiers::default())
    }

    pub fn backspace() -> Self {
        Self::new(Key::Backspace, Modifiers::default())
    }

    pub fn enter() -> Self {
        Self::new(Key::Enter, Modifiers::default())
    }

    pub fn with_ctrl(ch: char) -> Self {
        Self::new(Key::Char(ch), Modifiers::ctrl())
    }

    pub fn with_meta(ch: char) -> Self {
        Self::new(Key::Char(ch), Modifiers::meta())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A rule handled the key; default handling must not run.
    Consumed,
    Ignored,
}

impl Editor {
    /// Offers `event` to the registered key rules in registration order.
    /// The first rule that consumes it wins. A failing rule is logged and
    /// treated as if it had ignored the key.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let handlers: Vec<Arc<dyn KeyHandler>> = self.registry().key_handlers().to_vec();
        for handler in handlers {
            match handler.handle(self, event) {
                Ok(KeyOutcome::Consumed) => {
                    tracing::trace!(rule = handler.id(), "key consumed");
                    return KeyOutcome::Consumed;
                }
                Ok(KeyOutcome::Ignored) => {}
                Err(err) => {
                    tracing::debug!(rule = handler.id(), "key rule failed: {}", err.message());
                }
            }
        }
        KeyOutcome::Ignored
    }

    /// Plain editing behavior for a key no rule consumed.
    pub fn apply_default_key(&mut self, event: &KeyEvent) -> Result<(), ApplyError> {
        match event.key {
            Key::Char(_) if event.modifiers.platform() => Ok(()),
            Key::Char(ch) => {
                let mut buf = [0u8; 4];
                self.insert_text(ch.encode_utf8(&mut buf))
            }
            Key::Space => self.insert_text(" "),
            Key::Backspace => self.delete_backward(Unit::Character),
            Key::Enter => self.insert_break(),
        }
    }

    /// Full key-down path: rules first, then default handling.
    pub fn key_down(&mut self, event: &KeyEvent) -> Result<KeyOutcome, ApplyError> {
        let outcome = self.handle_key(event);
        if outcome == KeyOutcome::Ignored {
            self.apply_default_key(event)?;
        }
        Ok(outcome)
    }

    /// Types `text` one key at a time, as a keyboard would.
    pub fn type_text(&mut self, text: &str) -> Result<(), ApplyError> {
        for ch in text.chars() {
            let event = match ch {
                ' ' => KeyEvent::space(),
                '\n' => KeyEvent::enter(),
                ch => KeyEvent::char(ch),
            };
            self.key_down(&event)?;
        }
        Ok(())
    }
}
