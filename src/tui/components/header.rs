//! Title bar

use iocraft::prelude::*;

use crate::tui::theme::theme;

#[derive(Default, Props)]
pub struct HeaderProps {
    pub title: String,
    /// Shown right-aligned, e.g. the data source
    pub source: Option<String>,
    /// Selection breadcrumb shown after the title
    pub subtitle: Option<String>,
}

#[component]
pub fn Header(props: &HeaderProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    let left_text = match &props.subtitle {
        Some(sub) => format!("{} - {}", props.title, sub),
        None => props.title.clone(),
    };

    element! {
        View(
            width: 100pct,
            height: 1,
            flex_direction: FlexDirection::Row,
            flex_shrink: 0.0,
            justify_content: JustifyContent::SpaceBetween,
            padding_left: 1,
            padding_right: 1,
            background_color: theme.highlight,
        ) {
            Text(content: left_text, color: theme.text, weight: Weight::Bold)
            #(props.source.clone().map(|source| element! {
                Text(content: source, color: theme.text)
            }))
        }
    }
}
