//! Hotkey definitions.

use std::{fmt as stdfmt, sync::Arc};

use ahk_keycode::{Direction, Key};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Action, Error, Generator, HotkeyCallback, Result, escape, fmt};

/// Script-side function the generated callback invocation calls.
pub const SEND_FUNCTION: &str = "SendPipeMessage";

/// How the engine synthesizes input inside a hotkey body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SendMode {
    /// `SendInput`, the fastest and most reliable mode.
    #[default]
    Input,
    /// `SendPlay`.
    Play,
    /// `SendEvent`.
    Event,
    /// `SendInput`, falling back to `SendPlay`.
    InputThenPlay,
}

impl SendMode {
    /// Directive argument spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Play => "Play",
            Self::Event => "Event",
            Self::InputThenPlay => "InputThenPlay",
        }
    }
}

/// Where the callback invocation sits relative to the body actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackPlacement {
    /// Before the body.
    #[default]
    Start,
    /// After the body.
    End,
}

/// The key or key pair that fires a hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A single key.
    Key(Key),
    /// A custom combination: hold `left`, press `right`.
    Combo(Key, Key),
}

/// A hotkey definition, built with chained setters.
#[derive(Clone)]
pub struct Hotkey {
    /// Trigger key(s).
    trigger: Trigger,
    /// Distinct modifiers in the order given.
    modifiers: Vec<Key>,
    /// When false, the native key event passes through (`~`).
    blocking: bool,
    /// Send mode directive at the top of the body.
    send_mode: SendMode,
    /// Fire on key down or key up.
    direction: Direction,
    /// Body actions.
    actions: Vec<Action>,
    /// Host callback invoked through the bridge.
    callback: Option<HotkeyCallback>,
    /// Position of the callback invocation.
    placement: CallbackPlacement,
    /// Script variable receiving the callback's result.
    capture: Option<String>,
}

impl stdfmt::Debug for Hotkey {
    fn fmt(&self, f: &mut stdfmt::Formatter<'_>) -> stdfmt::Result {
        f.debug_struct("Hotkey")
            .field("trigger", &self.trigger)
            .field("modifiers", &self.modifiers)
            .field("blocking", &self.blocking)
            .field("send_mode", &self.send_mode)
            .field("direction", &self.direction)
            .field("actions", &self.actions)
            .field("callback", &self.callback.is_some())
            .field("placement", &self.placement)
            .field("capture", &self.capture)
            .finish()
    }
}

/// Order-preserving dedup.
fn distinct(keys: impl IntoIterator<Item = Key>) -> Vec<Key> {
    let mut out = Vec::new();
    for k in keys {
        if !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

impl Hotkey {
    /// Hotkey on a single key.
    pub fn new(key: Key, modifiers: impl IntoIterator<Item = Key>) -> Self {
        Self {
            trigger: Trigger::Key(key),
            modifiers: distinct(modifiers),
            blocking: false,
            send_mode: SendMode::Input,
            direction: Direction::Down,
            actions: Vec::new(),
            callback: None,
            placement: CallbackPlacement::Start,
            capture: None,
        }
    }

    /// Hotkey on a key pair (`left & right`).
    pub fn combo(left: Key, right: Key, modifiers: impl IntoIterator<Item = Key>) -> Self {
        Self::new(left, modifiers).pair(left, right)
    }

    /// Trigger on a single key, replacing any pair.
    pub fn key(mut self, key: Key) -> Self {
        self.trigger = Trigger::Key(key);
        self
    }

    /// Trigger on a key pair, replacing any single key.
    pub fn pair(mut self, left: Key, right: Key) -> Self {
        self.trigger = Trigger::Combo(left, right);
        self
    }

    /// Replace the modifier set.
    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Key>) -> Self {
        self.modifiers = distinct(modifiers);
        self
    }

    /// Block the native key event instead of letting it pass through.
    pub fn block(mut self, yes: bool) -> Self {
        self.blocking = yes;
        self
    }

    /// Set the body's send mode.
    pub fn send_mode(mut self, mode: SendMode) -> Self {
        self.send_mode = mode;
        self
    }

    /// Append one body action.
    pub fn action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Append several body actions.
    pub fn actions<A: Into<Action>>(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Append raw script text to the body.
    pub fn snippet(self, code: impl Into<String>) -> Self {
        self.action(Action::raw(code))
    }

    /// Set the trigger edge without touching the callback.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Fire on key down and invoke `callback` at the start of the body.
    pub fn on_down<F>(self, callback: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.on_down_at(callback, CallbackPlacement::Start)
    }

    /// Fire on key up and invoke `callback` at the start of the body.
    pub fn on_up<F>(self, callback: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.on_up_at(callback, CallbackPlacement::Start)
    }

    /// Fire on key down with the callback at `placement`.
    pub fn on_down_at<F>(self, callback: F, placement: CallbackPlacement) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_callback(Direction::Down, Arc::new(callback), placement)
    }

    /// Fire on key up with the callback at `placement`.
    pub fn on_up_at<F>(self, callback: F, placement: CallbackPlacement) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_callback(Direction::Up, Arc::new(callback), placement)
    }

    /// Fire on key up and store the callback's result in script variable
    /// `var`. Fails if `var` is empty or whitespace.
    pub fn on_up_into<F>(self, var: &str, callback: F, placement: CallbackPlacement) -> Result<Self>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.capture_into(var, Direction::Up, Arc::new(callback), placement)
    }

    /// Fire on key down and store the callback's result in script variable
    /// `var`. Fails if `var` is empty or whitespace.
    pub fn on_down_into<F>(
        self,
        var: &str,
        callback: F,
        placement: CallbackPlacement,
    ) -> Result<Self>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.capture_into(var, Direction::Down, Arc::new(callback), placement)
    }

    /// Attach a callback whose result is assigned to `var`.
    fn capture_into(
        mut self,
        var: &str,
        direction: Direction,
        callback: HotkeyCallback,
        placement: CallbackPlacement,
    ) -> Result<Self> {
        if var.trim().is_empty() {
            return Err(Error::InvalidPipeVariable);
        }
        self.capture = Some(var.trim().to_string());
        Ok(self.with_callback(direction, callback, placement))
    }

    /// Attach a callback firing on `direction`.
    fn with_callback(
        mut self,
        direction: Direction,
        callback: HotkeyCallback,
        placement: CallbackPlacement,
    ) -> Self {
        self.direction = direction;
        self.callback = Some(callback);
        self.placement = placement;
        self
    }

    /// The trigger.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// True when the native key event is blocked.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// True when a callback is attached.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Resolved header text, e.g. `^a UP` or `a & Control`.
    ///
    /// Modifiers that are not modifier keys are dropped; for a pair, a
    /// modifier equal to either trigger key is dropped too. `None` when a
    /// trigger key has no label.
    pub fn header(&self) -> Option<String> {
        let (keys, excluded) = match self.trigger {
            Trigger::Key(k) => (k.label()?.to_string(), None),
            Trigger::Combo(l, r) => (format!("{} & {}", l.label()?, r.label()?), Some((l, r))),
        };
        let prefix: String = self
            .modifiers
            .iter()
            .filter(|m| excluded.is_none_or(|(l, r)| **m != l && **m != r))
            .filter_map(|m| m.modifier_symbol())
            .collect();
        let up = if self.direction == Direction::Up { " UP" } else { "" };
        Some(format!("{prefix}{keys}{up}"))
    }

    /// The invocation line for `anchor`, if the callback sits there.
    fn invocation(&self, header: &str, anchor: CallbackPlacement) -> Option<String> {
        if self.callback.is_none() || self.placement != anchor {
            return None;
        }
        let quoted = escape::quote(header)?;
        let call = fmt::func_call(SEND_FUNCTION, &[&quoted]);
        Some(match &self.capture {
            Some(var) => fmt::set(var, &call),
            None => call,
        })
    }

    /// Build the definition. Registers the callback (if any) with the
    /// generator's registry under the header text.
    ///
    /// Returns an empty string when the trigger cannot be resolved.
    pub fn build(&self, generator: &Generator) -> String {
        let Some(header) = self.header() else {
            debug!(trigger = ?self.trigger, "hotkey_unresolved");
            return String::new();
        };
        if let Some(cb) = &self.callback {
            generator.register(&header, cb);
        }

        let mut out = String::new();
        if !self.blocking {
            out.push('~');
        }
        out.push_str(&header);
        out.push_str("::\n{\n");
        generator.push_indented(&mut out, &fmt::send_mode(self.send_mode), 1);
        if let Some(line) = self.invocation(&header, CallbackPlacement::Start) {
            generator.push_indented(&mut out, &line, 1);
        }
        out.push_str(&generator.generate(&self.actions, 1));
        if let Some(line) = self.invocation(&header, CallbackPlacement::End) {
            generator.push_indented(&mut out, &line, 1);
        }
        generator.push_indented(&mut out, "return", 1);
        out.push_str("}\n");
        out
    }
}
