//! Compact inline selector for enum fields
//!
//! Displays as: Label: ◀ value ▶

use iocraft::prelude::*;

use crate::tui::theme::theme;
use crate::types::NotePriority;

#[derive(Default, Props)]
pub struct SelectProps<'a> {
    pub label: Option<&'a str>,
    pub options: Vec<String>,
    pub selected_index: usize,
    pub has_focus: bool,
    /// Semantic color for the value
    pub value_color: Option<Color>,
}

#[component]
pub fn Select<'a>(props: &SelectProps<'a>) -> impl Into<AnyElement<'a>> {
    let theme = theme();
    let accent = theme.focus_color(props.has_focus);
    let value_color = props.value_color.unwrap_or(theme.text);

    let current_value = props
        .options
        .get(props.selected_index)
        .cloned()
        .unwrap_or_default();

    element! {
        View(flex_direction: FlexDirection::Row, gap: 1) {
            #(props.label.map(|label| element! {
                Text(content: format!("{}:", label), color: accent)
            }))
            Text(content: "◀", color: accent)
            Text(content: current_value, color: value_color)
            Text(content: "▶", color: accent)
        }
    }
}

/// Enum types that can be cycled through in a `Select`
pub trait Selectable: Sized + Clone + Copy + 'static {
    fn all_values() -> Vec<Self>;
    fn index(&self) -> usize;
    fn from_index(index: usize) -> Option<Self>;

    /// Next value (wrapping)
    fn next(&self) -> Self {
        let values = Self::all_values();
        values[(self.index() + 1) % values.len()]
    }

    /// Previous value (wrapping)
    fn prev(&self) -> Self {
        let values = Self::all_values();
        let idx = self.index();
        values[if idx == 0 { values.len() - 1 } else { idx - 1 }]
    }
}

impl Selectable for NotePriority {
    fn all_values() -> Vec<Self> {
        NotePriority::ALL.to_vec()
    }

    fn index(&self) -> usize {
        match self {
            NotePriority::None => 0,
            NotePriority::Low => 1,
            NotePriority::Medium => 2,
            NotePriority::High => 3,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        NotePriority::ALL.get(index).copied()
    }
}
