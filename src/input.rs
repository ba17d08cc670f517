//! Keyboard bindings and pointer gesture recognition

use crate::spread::Side;
use iced::keyboard::Key;
use iced::keyboard::key::Named;
use iced::{Point, Vector};
use std::time::{Duration, Instant};

/// Pointer id used when the left mouse button stands in for a finger
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// Reader command that results from key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    /// Turn toward a side of the screen; the reading direction decides next or previous
    Turn(Side),
    NextSlot,
    PreviousSlot,
    FirstSlot,
    LastSlot,
    /// Jump to a 1-based page number
    JumpToPage(usize),
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleChrome,
    ToggleSettings,
    OpenFile,
    FlipDirection,
    FlipLayout,
    /// Escape: dismiss whatever is on top
    Cancel,
    Quit,
    None,
}

/// Key handler with a pending count for page jumps (`12<Enter>`) and `gg`
pub struct KeyHandler {
    pending: String,
}

impl KeyHandler {
    pub fn new() -> Self {
        Self {
            pending: String::new(),
        }
    }

    /// Digits typed so far, or `g` while waiting for the second `g`
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn handle_key(&mut self, key: &Key) -> ReaderAction {
        let awaiting_g = self.pending == "g";
        if awaiting_g || !extends_pending(key) {
            self.pending.clear();
        }

        match key.as_ref() {
            Key::Named(Named::ArrowLeft) | Key::Character("h") => ReaderAction::Turn(Side::Left),
            Key::Named(Named::ArrowRight) | Key::Character("l") => {
                ReaderAction::Turn(Side::Right)
            }
            Key::Named(Named::PageDown | Named::Space | Named::ArrowDown)
            | Key::Character("j") => ReaderAction::NextSlot,
            Key::Named(Named::PageUp | Named::ArrowUp) | Key::Character("k") => {
                ReaderAction::PreviousSlot
            }
            Key::Named(Named::Home) => ReaderAction::FirstSlot,
            Key::Character("g") if awaiting_g => ReaderAction::FirstSlot,
            Key::Character("g") => {
                self.pending = "g".to_string();
                ReaderAction::None
            }
            Key::Named(Named::End) | Key::Character("G") => ReaderAction::LastSlot,

            Key::Character("0") if self.pending.is_empty() => ReaderAction::ResetZoom,
            Key::Character(c) if !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()) => {
                self.pending.push_str(c);
                ReaderAction::None
            }
            Key::Named(Named::Enter) if !self.pending.is_empty() => {
                let parsed = self.pending.parse::<usize>();
                self.pending.clear();
                parsed.map_or(ReaderAction::None, ReaderAction::JumpToPage)
            }
            Key::Named(Named::Escape) => {
                self.pending.clear();
                ReaderAction::Cancel
            }

            Key::Character("r") => ReaderAction::ResetZoom,
            Key::Character("+" | "=") => ReaderAction::ZoomIn,
            Key::Character("-") => ReaderAction::ZoomOut,
            Key::Character("f") => ReaderAction::ToggleChrome,
            Key::Character("s") => ReaderAction::ToggleSettings,
            Key::Character("o") => ReaderAction::OpenFile,
            Key::Character("d") => ReaderAction::FlipDirection,
            Key::Character("t") => ReaderAction::FlipLayout,
            Key::Character("q" | "Q") => ReaderAction::Quit,
            _ => ReaderAction::None,
        }
    }
}

impl Default for KeyHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys that continue a count or a `g` prefix; anything else drops it
fn extends_pending(key: &Key) -> bool {
    match key.as_ref() {
        Key::Character(c) => c == "g" || (!c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit())),
        Key::Named(Named::Enter) => true,
        _ => false,
    }
}

/// Raw pointer input in view coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Pressed {
        id: u64,
        position: Point,
        at: Instant,
    },
    Moved {
        id: u64,
        position: Point,
    },
    Released {
        id: u64,
        position: Point,
        at: Instant,
    },
    /// The platform cancelled the pointer
    Lost { id: u64 },
}

/// Recognized gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Pan(Vector),
    Pinch { factor: f32, focus: Point },
    /// Every pointer is up
    Released,
    DoubleTap(Point),
    LongPress(Point),
    /// Horizontal fling; carries the side being revealed
    Swipe(Side),
}

/// Timing and distance thresholds for gesture classification
#[derive(Debug, Clone, Copy)]
struct GestureThresholds {
    tap_slop: f32,
    double_tap_slop: f32,
    double_tap_timeout: Duration,
    long_press: Duration,
    swipe_distance: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            tap_slop: 16.0,
            double_tap_slop: 48.0,
            double_tap_timeout: Duration::from_millis(300),
            long_press: Duration::from_millis(500),
            swipe_distance: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    at: Instant,
    travel: Vector,
    multi_touch: bool,
}

/// Turns pointer input into pan, pinch, tap and swipe gestures
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    thresholds: GestureThresholds,
    pointers: Vec<(u64, Point)>,
    press: Option<Press>,
    span: Option<f32>,
    last_tap: Option<(Instant, Point)>,
}

impl GestureTracker {
    /// Number of pointers currently down
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn handle(&mut self, input: PointerInput) -> Vec<Gesture> {
        match input {
            PointerInput::Pressed { id, position, at } => {
                self.pointers.retain(|(existing, _)| *existing != id);
                self.pointers.push((id, position));
                match self.pointers.len() {
                    1 => {
                        self.press = Some(Press {
                            origin: position,
                            at,
                            travel: Vector::new(0.0, 0.0),
                            multi_touch: false,
                        });
                    }
                    _ => {
                        if let Some(press) = self.press.as_mut() {
                            press.multi_touch = true;
                        }
                        self.span = self.current_span();
                    }
                }
                Vec::new()
            }
            PointerInput::Moved { id, position } => self.moved(id, position),
            PointerInput::Released { id, position, at } => self.lifted(id, Some((position, at))),
            PointerInput::Lost { id } => self.lifted(id, None),
        }
    }

    fn moved(&mut self, id: u64, position: Point) -> Vec<Gesture> {
        let Some(slot) = self.pointers.iter_mut().find(|(existing, _)| *existing == id) else {
            return Vec::new();
        };
        let delta = position - slot.1;
        slot.1 = position;

        if self.pointers.len() >= 2 {
            let Some(span) = self.current_span() else {
                return Vec::new();
            };
            let focus = self.focus();
            let previous = self.span.replace(span);
            match previous {
                Some(previous) if previous > 0.0 && span > 0.0 => vec![Gesture::Pinch {
                    factor: span / previous,
                    focus,
                }],
                _ => Vec::new(),
            }
        } else {
            if let Some(press) = self.press.as_mut() {
                press.travel = press.travel + delta;
            }
            vec![Gesture::Pan(delta)]
        }
    }

    fn lifted(&mut self, id: u64, release: Option<(Point, Instant)>) -> Vec<Gesture> {
        let before = self.pointers.len();
        self.pointers.retain(|(existing, _)| *existing != id);
        if self.pointers.len() == before {
            return Vec::new();
        }

        if !self.pointers.is_empty() {
            // Dropping from a pinch to one finger starts a fresh span
            self.span = self.current_span();
            return Vec::new();
        }

        self.span = None;
        let mut gestures = vec![Gesture::Released];
        let press = self.press.take();
        if let (Some(press), Some((position, at))) = (press, release) {
            if let Some(gesture) = self.classify(press, position, at) {
                gestures.push(gesture);
            }
        }
        gestures
    }

    fn classify(&mut self, press: Press, position: Point, at: Instant) -> Option<Gesture> {
        if press.multi_touch {
            self.last_tap = None;
            return None;
        }

        let travel = press.travel.x.hypot(press.travel.y);
        let held = at.saturating_duration_since(press.at);

        if travel < self.thresholds.tap_slop {
            if held >= self.thresholds.long_press {
                self.last_tap = None;
                return Some(Gesture::LongPress(press.origin));
            }
            if let Some((previous_at, previous_position)) = self.last_tap.take() {
                let gap = press.at.saturating_duration_since(previous_at);
                if gap <= self.thresholds.double_tap_timeout
                    && previous_position.distance(position) <= self.thresholds.double_tap_slop
                {
                    return Some(Gesture::DoubleTap(position));
                }
            }
            self.last_tap = Some((at, position));
            return None;
        }

        self.last_tap = None;
        let horizontal = press.travel.x.abs();
        if horizontal >= self.thresholds.swipe_distance && horizontal > press.travel.y.abs() {
            // Finger moving left brings in what lies to the right
            let side = if press.travel.x < 0.0 {
                Side::Right
            } else {
                Side::Left
            };
            return Some(Gesture::Swipe(side));
        }
        None
    }

    fn current_span(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Some(a.distance(*b)),
            _ => None,
        }
    }

    fn focus(&self) -> Point {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            [(_, a)] => *a,
            [] => Point::ORIGIN,
        }
    }
}
