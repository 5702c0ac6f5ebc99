//! Keyboard shortcuts bar

use iocraft::prelude::*;

use super::shortcuts::ShortcutsBuilder;
use crate::form::FormStage;
use crate::tui::keymap::FormField;
use crate::tui::theme::theme;

/// A single keyboard shortcut entry
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// The key or key combination (e.g., "Tab", "C-s")
    pub key: String,
    pub action: String,
}

impl Shortcut {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub shortcuts: Vec<Shortcut>,
}

#[component]
pub fn Footer(props: &FooterProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    element! {
        View(
            width: 100pct,
            min_height: 1,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            flex_shrink: 0.0,
            padding_left: 1,
            padding_right: 1,
            column_gap: 2,
            background_color: theme.border,
        ) {
            #(props.shortcuts.iter().map(|shortcut| {
                let key = shortcut.key.clone();
                let action = shortcut.action.clone();
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        Text(
                            content: format!("[{}]", key),
                            color: theme.highlight,
                            weight: Weight::Bold,
                        )
                        Text(
                            content: format!(" {}", action),
                            color: theme.text,
                        )
                    }
                }
            }))
        }
    }
}

/// Shortcuts for the focused field at the current stage
pub fn form_shortcuts(field: FormField, stage: FormStage) -> Vec<Shortcut> {
    let builder = ShortcutsBuilder::new().with_field_navigation();

    let builder = match field {
        FormField::Engineer | FormField::Ticket => {
            builder.with_list_navigation().add("Enter", "Choose")
        }
        FormField::Branch => builder,
        FormField::Note => builder.add("Enter", "New Line"),
        FormField::Priority => builder.add("←/→", "Change"),
        FormField::Paused | FormField::Completed => builder.add("Space", "Toggle"),
        FormField::Uploads => builder
            .add("Enter", "Attach")
            .add("↑/↓", "Pending")
            .add("Del", "Remove"),
        FormField::Images => builder.with_list_navigation().add("x", "Remove"),
    };

    let builder = if stage == FormStage::TicketChosen {
        builder.with_ticket_actions()
    } else {
        builder
    };

    builder.with_quit().build()
}
