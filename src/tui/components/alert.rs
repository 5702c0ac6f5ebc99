//! Inline alert bar for the form's last outcome

use iocraft::prelude::*;

use crate::form::Alert;
use crate::tui::theme::theme;

#[derive(Default, Props)]
pub struct AlertBarProps {
    pub alert: Option<Alert>,
}

/// Colored, dismissible message bar. Renders nothing without an alert.
#[component]
pub fn AlertBar(props: &AlertBarProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    element! {
        View() {
            #(props.alert.as_ref().map(|alert| {
                let color = theme.alert_color(alert.kind);
                element! {
                    View(
                        width: 100pct,
                        flex_direction: FlexDirection::Row,
                        justify_content: JustifyContent::SpaceBetween,
                        padding_left: 1,
                        padding_right: 1,
                        border_style: BorderStyle::Single,
                        border_color: color,
                    ) {
                        Text(content: alert.message.clone(), color: color, weight: Weight::Bold)
                        Text(content: "Esc to dismiss", color: theme.text_dimmed)
                    }
                }
            }))
        }
    }
}
