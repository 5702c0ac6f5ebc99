//! Windowed list used for the engineer and ticket pickers and for the
//! pending/existing image lists.

use iocraft::prelude::*;

use crate::tui::theme::theme;

#[derive(Default, Props)]
pub struct OptionListProps {
    pub label: String,
    pub items: Vec<String>,
    /// Row under the keyboard cursor
    pub cursor: usize,
    /// Row that is currently chosen, marked with a bullet
    pub chosen: Option<usize>,
    pub has_focus: bool,
    /// Maximum number of rows shown at once
    pub visible_rows: usize,
    /// Shown instead of rows when `items` is empty
    pub empty_text: Option<String>,
}

/// First row to render so that `cursor` stays visible.
pub fn window_start(cursor: usize, visible_rows: usize, total: usize) -> usize {
    if visible_rows == 0 || total <= visible_rows {
        return 0;
    }
    let cursor = cursor.min(total - 1);
    if cursor < visible_rows {
        0
    } else {
        (cursor + 1 - visible_rows).min(total - visible_rows)
    }
}

#[component]
pub fn OptionList(props: &OptionListProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let total = props.items.len();
    let rows = props.visible_rows.max(1);
    let start = window_start(props.cursor, rows, total);
    let end = (start + rows).min(total);

    let rendered: Vec<AnyElement<'static>> = props.items[start..end]
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let index = start + i;
            let under_cursor = props.has_focus && index == props.cursor;
            let is_chosen = props.chosen == Some(index);
            let marker = if is_chosen { "●" } else { " " };
            element! {
                View(
                    height: 1,
                    padding_left: 1,
                    background_color: if under_cursor { theme.highlight } else { theme.background },
                ) {
                    Text(
                        content: format!("{} {}", marker, item),
                        color: if is_chosen { theme.selected } else { theme.text },
                        weight: if is_chosen { Weight::Bold } else { Weight::Normal },
                    )
                }
            }
            .into_any()
        })
        .collect();

    element! {
        View(flex_direction: FlexDirection::Column, width: 100pct) {
            Text(
                content: format!("{}:", props.label),
                color: theme.focus_color(props.has_focus),
            )
            View(
                flex_direction: FlexDirection::Column,
                width: 100pct,
                border_style: BorderStyle::Round,
                border_color: if props.has_focus { theme.border_focused } else { theme.border },
            ) {
                #(if total == 0 {
                    Some(element! {
                        View(height: 1, padding_left: 1) {
                            Text(
                                content: props.empty_text.clone().unwrap_or_default(),
                                color: theme.text_dimmed,
                            )
                        }
                    })
                } else {
                    None
                })
                #(if start > 0 {
                    Some(element! {
                        Text(content: format!("  {} more above", start), color: theme.text_dimmed)
                    })
                } else {
                    None
                })
                #(rendered)
                #(if end < total {
                    Some(element! {
                        Text(content: format!("  {} more below", total - end), color: theme.text_dimmed)
                    })
                } else {
                    None
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(0, 5, 3), 0);
        assert_eq!(window_start(4, 5, 20), 0);
        assert_eq!(window_start(5, 5, 20), 1);
        assert_eq!(window_start(19, 5, 20), 15);
        assert_eq!(window_start(50, 5, 20), 15);
    }
}
