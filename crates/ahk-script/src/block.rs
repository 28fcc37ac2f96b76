use std::time::Duration;

use ahk_keycode::Key;
use tracing::debug;

use crate::{Action, ExecuteOption, Generator, Hotkey, KeyAction, ScriptEngine};

/// Result of handing a block to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the engine accepted the code.
    pub ok: bool,
    /// The generated code.
    pub code: String,
}

/// An ordered list of actions rendered and run as one unit.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Raw text emitted before the actions.
    initial: String,
    /// Actions in order.
    actions: Vec<Action>,
}

impl Block {
    /// Empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block starting with raw text.
    pub fn with_snippet(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            actions: Vec::new(),
        }
    }

    /// Send several keys in one statement.
    pub fn send(self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.action(KeyAction::send(keys))
    }

    /// Key down, released at the end of the block.
    pub fn down(self, key: Key) -> Self {
        self.action(KeyAction::down(key))
    }

    /// Key down held for `duration`.
    pub fn down_for(self, key: Key, duration: Duration) -> Self {
        self.action(KeyAction::down_for(key, duration))
    }

    /// Key up.
    pub fn up(self, key: Key) -> Self {
        self.action(KeyAction::up(key))
    }

    /// Key press.
    pub fn press(self, key: Key) -> Self {
        self.action(KeyAction::press(key))
    }

    /// Click a mouse button `amount` times; ignored for non-mouse keys.
    pub fn click(self, key: Key, amount: u32) -> Self {
        if !key.is_mouse() {
            return self;
        }
        self.action(Action::click(key, amount))
    }

    /// Left click.
    pub fn left_click(self) -> Self {
        self.action(KeyAction::mouse_press(Key::LeftButton))
    }

    /// Right click.
    pub fn right_click(self) -> Self {
        self.action(KeyAction::mouse_press(Key::RightButton))
    }

    /// Pause.
    pub fn sleep(self, duration: Duration) -> Self {
        self.action(Action::sleep(duration))
    }

    /// Raw text.
    pub fn snippet(self, code: impl Into<String>) -> Self {
        self.action(Action::raw(code))
    }

    /// Nested hotkey definition.
    pub fn hotkey(self, hotkey: Hotkey) -> Self {
        self.action(hotkey)
    }

    /// Any action.
    pub fn action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Actions in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Render the block.
    pub fn text(&self, generator: &Generator) -> String {
        let mut out = String::new();
        if !self.initial.is_empty() {
            out.push_str(&self.initial);
            if !self.initial.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(&generator.generate(&self.actions, 0));
        out
    }

    /// Render and run immediately.
    pub fn execute<E: ScriptEngine + ?Sized>(&self, engine: &E, generator: &Generator) -> Outcome {
        let code = self.text(generator);
        let ok = engine.execute(&code);
        debug!(ok, lines = code.lines().count(), "block_execute");
        Outcome { ok, code }
    }

    /// Render and add to the running script.
    pub fn complete<E: ScriptEngine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        option: ExecuteOption,
    ) -> Outcome {
        let code = self.text(generator);
        let ok = engine.load_script(&code, option);
        debug!(ok, ?option, lines = code.lines().count(), "block_complete");
        Outcome { ok, code }
    }
}
