//! Labelled text input with a trailing cursor

use iocraft::prelude::*;

use crate::tui::theme::theme;

#[derive(Default, Props)]
pub struct TextFieldProps {
    pub label: String,
    pub value: String,
    pub has_focus: bool,
    /// Render every line of `value` instead of a single row
    pub multiline: bool,
    /// Dimmed text shown when `value` is empty and the field is unfocused
    pub placeholder: Option<String>,
}

#[component]
pub fn TextField(props: &TextFieldProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    let mut lines: Vec<String> = if props.multiline {
        props.value.split('\n').map(str::to_string).collect()
    } else {
        vec![props.value.clone()]
    };
    let show_placeholder = props.value.is_empty() && !props.has_focus;
    if props.has_focus
        && let Some(last) = lines.last_mut()
    {
        last.push('_');
    }

    let rendered: Vec<AnyElement<'static>> = if show_placeholder {
        vec![
            element! {
                Text(
                    content: props.placeholder.clone().unwrap_or_default(),
                    color: theme.text_dimmed,
                )
            }
            .into_any(),
        ]
    } else {
        lines
            .into_iter()
            .map(|line| element! { Text(content: line, color: theme.text) }.into_any())
            .collect()
    };

    element! {
        View(flex_direction: FlexDirection::Column, width: 100pct) {
            Text(
                content: format!("{}:", props.label),
                color: theme.focus_color(props.has_focus),
            )
            View(
                flex_direction: FlexDirection::Column,
                border_style: BorderStyle::Round,
                border_color: if props.has_focus { theme.border_focused } else { theme.border },
                padding_left: 1,
                padding_right: 1,
                width: 100pct,
            ) {
                #(rendered)
            }
        }
    }
}
