//! Accessible dropdown menus: open/close state, roving focus across menu
//! items and viewport-aware placement.
//!
//! [`Dropdown`] holds the state machine and talks to the page only through
//! [`MenuSurface`]; [`web`] binds it to real toggle/menu elements.

pub(crate) mod web;

use std::str::FromStr;
use strum::{AsRefStr, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr)]
pub enum Placement {
    #[strum(serialize = "dropdown-menu-top")]
    Top,
    #[strum(serialize = "dropdown-menu-end")]
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// The toggle/menu pair as seen by the state machine.
///
/// Items are indexed in DOM order and must be re-read on every call.
pub trait MenuSurface {
    fn is_expanded(&self) -> bool;
    /// `true` marks the toggle expanded; `false` clears the state entirely.
    fn set_expanded(&mut self, expanded: bool);

    fn item_count(&self) -> usize;
    fn item_text(&self, index: usize) -> String;
    fn set_item_tab_index(&mut self, index: usize, tab_index: i32);
    fn focus_item(&mut self, index: usize);
    fn focus_toggle(&mut self);

    fn menu_rect(&self) -> Rect;
    fn viewport(&self) -> Viewport;
    fn has_placement(&self, placement: Placement) -> bool;
    fn add_placement(&mut self, placement: Placement);
    fn remove_placement(&mut self, placement: Placement);
}

/// `KeyboardEvent.key` values the menus react to, legacy spellings included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
pub enum NamedKey {
    Enter,
    #[strum(serialize = " ")]
    Space,
    #[strum(serialize = "ArrowDown", serialize = "Down")]
    ArrowDown,
    #[strum(serialize = "ArrowUp", serialize = "Up")]
    ArrowUp,
    #[strum(serialize = "Escape", serialize = "Esc")]
    Escape,
    #[strum(serialize = "Home", serialize = "PageUp")]
    Home,
    #[strum(serialize = "End", serialize = "PageDown")]
    End,
    Tab,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Key {
    Named(NamedKey),
    /// A single printable, non-whitespace character.
    Char(char),
    #[default]
    Other,
}

impl Key {
    pub fn parse(key: &str) -> Self {
        if let Ok(named) = NamedKey::from_str(key) {
            return Key::Named(named);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() && !c.is_control() => Key::Char(c),
            _ => Key::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: Key::parse(key),
            ..Default::default()
        }
    }

    pub fn shifted(mut self) -> Self {
        self.shift = true;
        self
    }

    fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// What the event binding should do with the DOM event afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    /// Handled: stop propagation and prevent the default action.
    Consumed,
    /// Acted on, but the browser default (e.g. moving focus on Tab) still runs.
    Passthrough,
}

pub struct Dropdown<M> {
    surface: M,
    placement_top: bool,
    placement_end: bool,
    focused_index: Option<usize>,
}

impl<M: MenuSurface> Dropdown<M> {
    pub fn new(mut surface: M) -> Self {
        let placement_top = surface.has_placement(Placement::Top);
        let placement_end = surface.has_placement(Placement::End);
        for i in 0..surface.item_count() {
            surface.set_item_tab_index(i, -1);
        }
        Self {
            surface,
            placement_top,
            placement_end,
            focused_index: None,
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn is_expanded(&self) -> bool {
        self.surface.is_expanded()
    }

    #[cfg(test)]
    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    /// The focused item, if it still exists.
    fn current(&self) -> Option<usize> {
        self.focused_index.filter(|&i| i < self.surface.item_count())
    }

    pub fn open(&mut self) {
        if self.is_expanded() {
            return;
        }
        self.surface.set_expanded(true);
        self.handle_overflow();
    }

    pub fn dismiss(&mut self) {
        if !self.is_expanded() {
            return;
        }
        self.surface.set_expanded(false);
        self.surface.remove_placement(Placement::End);
        self.surface.remove_placement(Placement::Top);
        self.focused_index = None;
    }

    pub fn handle_overflow(&mut self) {
        let rect = self.surface.menu_rect();
        let viewport = self.surface.viewport();

        let overflow_right = rect.left < 0.0 || rect.left + rect.width > viewport.width;
        let overflow_bottom = rect.top < 0.0 || rect.top + rect.height > viewport.height;

        if overflow_right || self.placement_end {
            self.surface.add_placement(Placement::End);
        }

        if overflow_bottom || self.placement_top {
            self.surface.add_placement(Placement::Top);
        }

        // Flipping up must not push the menu past the top edge instead.
        if self.surface.menu_rect().top < 0.0 {
            self.surface.remove_placement(Placement::Top);
        }
    }

    fn focus_by_index(&mut self, index: usize) {
        let count = self.surface.item_count();
        if count == 0 || index >= count {
            return;
        }
        for i in 0..count {
            if i == index {
                self.surface.set_item_tab_index(i, 0);
                self.surface.focus_item(i);
            } else {
                self.surface.set_item_tab_index(i, -1);
            }
        }
        self.focused_index = Some(index);
    }

    pub fn focus_first(&mut self) {
        self.focus_by_index(0);
    }

    pub fn focus_last(&mut self) {
        let count = self.surface.item_count();
        if count > 0 {
            self.focus_by_index(count - 1);
        }
    }

    pub fn focus_next(&mut self, current: Option<usize>) {
        let count = self.surface.item_count();
        if count == 0 {
            return;
        }
        let next = current.map_or(0, |i| (i + 1) % count);
        self.focus_by_index(next);
    }

    pub fn focus_previous(&mut self, current: Option<usize>) {
        let count = self.surface.item_count();
        if count == 0 {
            return;
        }
        let previous = match current {
            Some(i) if i > 0 => (i - 1).min(count - 1),
            _ => count - 1,
        };
        self.focus_by_index(previous);
    }

    /// Moves to the next item (after `current`, wrapping) whose text starts
    /// with `ch`, compared case-insensitively.
    pub fn focus_by_char(&mut self, current: Option<usize>, ch: char) {
        let count = self.surface.item_count();
        if count == 0 {
            return;
        }

        let wanted: String = ch.to_lowercase().collect();
        let initials: Vec<Option<String>> = (0..count)
            .map(|i| {
                self.surface
                    .item_text(i)
                    .trim()
                    .chars()
                    .next()
                    .map(|c| c.to_lowercase().collect())
            })
            .collect();

        let start = current.map_or(0, |i| (i + 1) % count);
        let matches = |i: &usize| initials[*i].as_deref() == Some(wanted.as_str());

        if let Some(index) = (start..count).find(matches).or_else(|| (0..count).find(matches)) {
            self.focus_by_index(index);
        }
    }

    pub fn on_toggle_click(&mut self) {
        if self.is_expanded() {
            self.dismiss();
            self.surface.focus_toggle();
        } else {
            self.open();
            self.focus_first();
        }
    }

    pub fn on_toggle_key(&mut self, input: &KeyInput) -> KeyOutcome {
        match input.key {
            Key::Named(NamedKey::Enter | NamedKey::Space | NamedKey::ArrowDown) => {
                self.open();
                self.focus_first();
                KeyOutcome::Consumed
            }
            Key::Named(NamedKey::ArrowUp) => {
                self.open();
                self.focus_last();
                KeyOutcome::Consumed
            }
            Key::Named(NamedKey::Escape) => {
                self.dismiss();
                self.surface.focus_toggle();
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::Ignored,
        }
    }

    pub fn on_menu_key(&mut self, input: &KeyInput) -> KeyOutcome {
        if input.has_command_modifier() {
            return KeyOutcome::Ignored;
        }

        let current = self.current();
        match input.key {
            Key::Named(NamedKey::Escape) => {
                self.dismiss();
                self.surface.focus_toggle();
            }
            Key::Named(NamedKey::ArrowDown) => self.focus_next(current),
            Key::Named(NamedKey::ArrowUp) => self.focus_previous(current),
            Key::Named(NamedKey::Home) => self.focus_first(),
            Key::Named(NamedKey::End) => self.focus_last(),
            Key::Named(NamedKey::Tab) if input.shift => {
                self.dismiss();
                self.surface.focus_toggle();
            }
            Key::Named(NamedKey::Tab) => {
                self.dismiss();
                return KeyOutcome::Passthrough;
            }
            Key::Char(c) => self.focus_by_char(current, c),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Consumed
    }

    /// Click somewhere on the page; `inside` is whether it hit the toggle or the menu.
    pub fn on_document_click(&mut self, inside: bool) {
        if self.is_expanded() && !inside {
            self.dismiss();
            self.surface.focus_toggle();
        }
    }
}
