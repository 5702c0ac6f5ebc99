//! Colors shared by the form's components

use iocraft::prelude::Color;

use crate::form::AlertKind;
use crate::types::NotePriority;

const GREY: Color = Color::Rgb {
    r: 120,
    g: 120,
    b: 120,
};

#[derive(Debug, Clone)]
pub struct Theme {
    // Note priority colors
    pub priority_none: Color,
    pub priority_low: Color,
    pub priority_medium: Color,
    pub priority_high: Color,

    // Alert colors
    pub success: Color,
    pub error: Color,

    // UI colors
    pub border: Color,
    pub border_focused: Color,
    pub background: Color,
    pub text: Color,
    pub text_dimmed: Color,
    pub highlight: Color,
    pub selected: Color,
    pub ticket_number: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            priority_none: GREY,
            priority_low: Color::Green,
            priority_medium: Color::Yellow,
            priority_high: Color::Red,

            success: Color::Green,
            error: Color::Red,

            border: GREY,
            border_focused: Color::Blue,
            background: Color::Reset,
            text: Color::White,
            text_dimmed: GREY,
            highlight: Color::Blue,
            selected: Color::Cyan,
            ticket_number: Color::Cyan,
        }
    }
}

impl Theme {
    pub fn priority_color(&self, priority: NotePriority) -> Color {
        match priority {
            NotePriority::None => self.priority_none,
            NotePriority::Low => self.priority_low,
            NotePriority::Medium => self.priority_medium,
            NotePriority::High => self.priority_high,
        }
    }

    pub fn alert_color(&self, kind: AlertKind) -> Color {
        match kind {
            AlertKind::Success => self.success,
            AlertKind::Error => self.error,
        }
    }

    /// Label/border color for a field depending on focus
    pub fn focus_color(&self, has_focus: bool) -> Color {
        if has_focus {
            self.border_focused
        } else {
            self.text_dimmed
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);

pub fn theme() -> &'static Theme {
    &THEME
}
