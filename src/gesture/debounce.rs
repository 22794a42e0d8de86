//! Gesture → command debouncing.
//!
//! Raw labels arrive once per sampling tick and are noisy: a single pinch
//! flickers between buckets, and the detector drops the hand for a frame or
//! two. A [`DebouncePolicy`] turns that stream into rare, de-duplicated
//! [`Command`]s.
//!
//! | Policy        | Trigger                                   | Emits                 |
//! |---------------|-------------------------------------------|-----------------------|
//! | `MajorityVote`| K identical non-`None` labels in a row    | mapped command, once  |
//! | `DoublePulse` | two `Close` edges ≥ cooldown apart        | toggled `LedOn/Off`   |
//!
//! `now_ms` is a wrapping millisecond counter; only differences are used.

use heapless::Deque;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::app::commands::Command;

use super::classifier::GestureLabel;

/// Upper bound on the majority window capacity.
pub const MAX_WINDOW: usize = 16;

// ───────────────────────────────────────────────────────────────
// Configuration
// ───────────────────────────────────────────────────────────────

/// Which raw label maps to which command (majority policy only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureMap {
    pub close: Option<Command>,
    pub mid: Option<Command>,
    pub far: Option<Command>,
}

impl GestureMap {
    pub fn command_for(&self, label: GestureLabel) -> Option<Command> {
        match label {
            GestureLabel::None => None,
            GestureLabel::Close => self.close,
            GestureLabel::Mid => self.mid,
            GestureLabel::Far => self.far,
        }
    }
}

impl Default for GestureMap {
    /// Pinched shut turns the LED off, half-open blinks, wide open turns it on.
    fn default() -> Self {
        Self {
            close: Some(Command::LedOff),
            mid: Some(Command::LedBlink),
            far: Some(Command::LedOn),
        }
    }
}

/// Debounce policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DebounceConfig {
    Majority {
        #[serde(default = "default_window")]
        window: usize,
        #[serde(default)]
        map: GestureMap,
    },
    DoublePulse {
        #[serde(default = "default_cooldown_ms")]
        cooldown_ms: u32,
    },
}

fn default_window() -> usize {
    3
}

fn default_cooldown_ms() -> u32 {
    500
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::Majority {
            window: default_window(),
            map: GestureMap::default(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Policy trait
// ───────────────────────────────────────────────────────────────

/// Common interface of every debounce strategy.
pub trait DebouncePolicy {
    /// Feed one raw label sampled at `now_ms`. Returns a committed command
    /// when the policy's condition is satisfied.
    fn consume(&mut self, label: GestureLabel, now_ms: u32) -> Option<Command>;

    /// Drop in-progress state. Committed history (last emitted command,
    /// LED belief) survives.
    fn reset(&mut self);

    /// The most recently committed command.
    fn last_emitted(&self) -> Option<Command>;
}

// ───────────────────────────────────────────────────────────────
// Policy A: majority window
// ───────────────────────────────────────────────────────────────

/// Emits when the last K labels agree on a mapped, not-yet-emitted command.
#[derive(Debug, Clone)]
pub struct MajorityVote {
    window: Deque<GestureLabel, MAX_WINDOW>,
    capacity: usize,
    map: GestureMap,
    last_emitted: Option<Command>,
}

impl MajorityVote {
    /// `capacity` is clamped into `1..=MAX_WINDOW`; config validation
    /// rejects out-of-range values before this point.
    pub fn new(capacity: usize, map: GestureMap) -> Self {
        Self {
            window: Deque::new(),
            capacity: capacity.clamp(1, MAX_WINDOW),
            map,
            last_emitted: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    fn unanimous(&self) -> Option<GestureLabel> {
        if self.window.len() < self.capacity {
            return None;
        }
        let mut it = self.window.iter();
        let first = *it.next()?;
        if first.is_none() || !it.all(|l| *l == first) {
            return None;
        }
        Some(first)
    }
}

impl DebouncePolicy for MajorityVote {
    fn consume(&mut self, label: GestureLabel, _now_ms: u32) -> Option<Command> {
        while self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        // Cannot fail: the loop above leaves at least one free slot.
        let _ = self.window.push_back(label);

        let cmd = self.map.command_for(self.unanimous()?)?;
        if self.last_emitted == Some(cmd) {
            return None;
        }
        debug!("DEBOUNCE | majority x{} -> {:?}", self.capacity, cmd);
        self.last_emitted = Some(cmd);
        Some(cmd)
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn last_emitted(&self) -> Option<Command> {
        self.last_emitted
    }
}

// ───────────────────────────────────────────────────────────────
// Policy B: cooldown-gated double pulse
// ───────────────────────────────────────────────────────────────

/// Toggles the LED on every second `Close` edge.
///
/// An edge is a `Close` label whose predecessor was not `Close`. Edges that
/// land inside the cooldown after a counted edge are ignored, so one physical
/// pinch never counts twice. A `None` label clears a half-finished pair.
/// There is no idle timeout: a lone pulse pairs with the next one however
/// late it arrives.
#[derive(Debug, Clone)]
pub struct DoublePulse {
    cooldown_ms: u32,
    led_belief: bool,
    pulses: u8,
    last_counted_ms: Option<u32>,
    prev: GestureLabel,
    last_emitted: Option<Command>,
}

impl DoublePulse {
    pub fn new(cooldown_ms: u32) -> Self {
        Self::with_belief(cooldown_ms, false)
    }

    pub fn with_belief(cooldown_ms: u32, led_belief: bool) -> Self {
        Self {
            cooldown_ms,
            led_belief,
            pulses: 0,
            last_counted_ms: None,
            prev: GestureLabel::None,
            last_emitted: None,
        }
    }

    /// What the client believes the LED currently shows.
    pub fn led_belief(&self) -> bool {
        self.led_belief
    }

    /// Pulses counted toward the current pair (0 or 1 between calls).
    pub fn pulse_count(&self) -> u8 {
        self.pulses
    }

    fn in_cooldown(&self, now_ms: u32) -> bool {
        self.last_counted_ms
            .is_some_and(|t| now_ms.wrapping_sub(t) < self.cooldown_ms)
    }
}

impl DebouncePolicy for DoublePulse {
    fn consume(&mut self, label: GestureLabel, now_ms: u32) -> Option<Command> {
        let prev = core::mem::replace(&mut self.prev, label);

        if label.is_none() {
            self.pulses = 0;
            return None;
        }

        let edge = label == GestureLabel::Close && prev != GestureLabel::Close;
        if !edge || self.in_cooldown(now_ms) {
            return None;
        }

        self.pulses += 1;
        self.last_counted_ms = Some(now_ms);
        debug!("DEBOUNCE | pulse {} at {}ms", self.pulses, now_ms);

        if self.pulses < 2 {
            return None;
        }

        self.pulses = 0;
        self.led_belief = !self.led_belief;
        let cmd = if self.led_belief {
            Command::LedOn
        } else {
            Command::LedOff
        };
        self.last_emitted = Some(cmd);
        Some(cmd)
    }

    fn reset(&mut self) {
        self.pulses = 0;
        self.prev = GestureLabel::None;
    }

    fn last_emitted(&self) -> Option<Command> {
        self.last_emitted
    }
}

// ───────────────────────────────────────────────────────────────
// Config-selected policy
// ───────────────────────────────────────────────────────────────

/// Runtime-selected debounce policy.
#[derive(Debug, Clone)]
pub enum Debouncer {
    Majority(MajorityVote),
    DoublePulse(DoublePulse),
}

impl Debouncer {
    pub fn from_config(config: &DebounceConfig) -> Self {
        match *config {
            DebounceConfig::Majority { window, map } => {
                Self::Majority(MajorityVote::new(window, map))
            }
            DebounceConfig::DoublePulse { cooldown_ms } => {
                Self::DoublePulse(DoublePulse::new(cooldown_ms))
            }
        }
    }

    fn policy(&mut self) -> &mut dyn DebouncePolicy {
        match self {
            Self::Majority(p) => p,
            Self::DoublePulse(p) => p,
        }
    }
}

impl DebouncePolicy for Debouncer {
    fn consume(&mut self, label: GestureLabel, now_ms: u32) -> Option<Command> {
        self.policy().consume(label, now_ms)
    }

    fn reset(&mut self) {
        self.policy().reset();
    }

    fn last_emitted(&self) -> Option<Command> {
        match self {
            Self::Majority(p) => p.last_emitted(),
            Self::DoublePulse(p) => p.last_emitted(),
        }
    }
}
