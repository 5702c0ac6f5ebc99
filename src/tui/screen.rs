//! Full-screen ticket update form (`ticketdesk form`)

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use iocraft::prelude::*;

use crate::backend::AnyBackend;
use crate::error::Result;
use crate::form::{BusyAction, FormStage, FormState, PendingUpload, TicketUpdateForm};
use crate::options::{labels, position_of, priority_options};
use crate::tui::components::{
    AlertBar, Footer, Header, OptionList, Select, Selectable, TextField, form_shortcuts,
};
use crate::tui::keymap::{FormAction, FormField, key_to_action};
use crate::tui::theme::theme;
use crate::types::TicketNumber;

pub type SharedForm = Arc<TicketUpdateForm<AnyBackend>>;

/// How often the screen re-reads controller state while requests run
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default, Props)]
pub struct TicketFormScreenProps {
    pub form: Option<SharedForm>,
    /// Where the data comes from, shown in the header
    pub source: Option<String>,
}

/// Split the upload input into file paths.
pub fn parse_upload_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

async fn read_uploads(input: &str) -> Result<Vec<PendingUpload>> {
    let mut uploads = Vec::new();
    for path in parse_upload_paths(input) {
        uploads.push(PendingUpload::from_path(&path).await?);
    }
    Ok(uploads)
}

/// Cursor position after moving one row up or down in a list of `len` rows.
pub fn step_cursor(current: usize, len: usize, up: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if up {
        current.saturating_sub(1)
    } else {
        (current + 1).min(len - 1)
    }
}

/// Keep a list cursor on a row after the list shrinks.
pub fn clamp_cursor(current: usize, len: usize) -> usize {
    current.min(len.saturating_sub(1))
}

fn checkbox(label: &str, checked: bool) -> String {
    format!("[{}] {}", if checked { "x" } else { " " }, label)
}

/// Wrap a controller call so the snapshot is refreshed once it finishes.
fn refresh_after<T, F, Fut>(
    form: Option<SharedForm>,
    snapshot: State<FormState>,
    op: F,
) -> impl Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Clone
where
    T: Send + 'static,
    F: Fn(SharedForm, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    move |arg: T| {
        let form = form.clone();
        let op = op.clone();
        let mut snapshot = snapshot;
        Box::pin(async move {
            if let Some(form) = form {
                op(form.clone(), arg).await;
                snapshot.set(form.snapshot());
            }
        })
    }
}

/// Ticket update form
///
/// Layout:
/// ```text
/// +------------------------------------------+
/// | Header                                    |
/// | Alert bar (when set)                      |
/// +---------------------+--------------------+
/// | Engineer picker     | Ticket picker      |
/// +---------------------+--------------------+
/// | Branch / Note / Priority / toggles        |
/// | Attach files + pending uploads            |
/// | Existing images                           |
/// | [ Save Changes ]  [ Delete Ticket ]       |
/// +------------------------------------------+
/// | Footer                                    |
/// +------------------------------------------+
/// ```
#[component]
pub fn TicketFormScreen<'a>(
    props: &TicketFormScreenProps,
    mut hooks: Hooks,
) -> impl Into<AnyElement<'a>> {
    let (_width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();
    let form = props.form.clone();

    let mut snapshot: State<FormState> = hooks.use_state({
        let form = form.clone();
        move || form.map(|f| f.snapshot()).unwrap_or_default()
    });
    let mut focused = hooks.use_state(FormField::default);
    let mut engineer_cursor = hooks.use_state(|| 0usize);
    let mut ticket_cursor = hooks.use_state(|| 0usize);
    let mut upload_cursor = hooks.use_state(|| 0usize);
    let mut image_cursor = hooks.use_state(|| 0usize);
    let mut upload_input = hooks.use_state(String::new);
    let mut input_error: State<Option<String>> = hooks.use_state(|| None);
    let mut should_exit = hooks.use_state(|| false);
    let mut load_started = hooks.use_state(|| false);

    hooks.use_future({
        let form = form.clone();
        async move {
            let Some(form) = form else {
                return;
            };
            loop {
                tokio::time::sleep(REFRESH_INTERVAL).await;
                let latest = form.snapshot();
                if *snapshot.read() != latest {
                    snapshot.set(latest);
                }
            }
        }
    });

    let load_handler: Handler<()> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        |form: SharedForm, ()| async move {
            let _ = form.load_engineers().await;
        },
    ));

    let engineer_handler: Handler<String> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        |form: SharedForm, engineer: String| async move {
            let _ = form.select_engineer(&engineer).await;
        },
    ));

    let ticket_handler: Handler<TicketNumber> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        |form: SharedForm, ticket_number: TicketNumber| async move {
            let _ = form.select_ticket(&ticket_number).await;
        },
    ));

    let save_handler: Handler<()> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        |form: SharedForm, ()| async move {
            let _ = form.submit().await;
        },
    ));

    let delete_handler: Handler<()> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        |form: SharedForm, ()| async move {
            let _ = form.delete_ticket().await;
        },
    ));

    let attach_handler: Handler<String> = hooks.use_async_handler(refresh_after(
        form.clone(),
        snapshot,
        move |form: SharedForm, input: String| {
            let mut upload_input = upload_input;
            let mut input_error = input_error;
            async move {
                match read_uploads(&input).await {
                    Ok(files) => {
                        form.attach_files(files);
                        upload_input.set(String::new());
                        input_error.set(None);
                    }
                    Err(e) => input_error.set(Some(e.to_string())),
                }
            }
        },
    ));

    // Engineers are loaded once on mount
    if !load_started.get() {
        load_started.set(true);
        load_handler.clone()(());
    }

    hooks.use_terminal_events({
        let form = form.clone();
        move |event| {
            let TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                return;
            };
            if kind == KeyEventKind::Release {
                return;
            }
            let Some(form) = form.as_ref() else {
                return;
            };

            let view = snapshot.read().clone();
            let stage = view.stage();
            let field = focused.get().clamp(stage);
            let Some(action) = key_to_action(code, modifiers, field) else {
                return;
            };

            match action {
                FormAction::Quit => should_exit.set(true),
                FormAction::NextField => focused.set(field.next(stage)),
                FormAction::PrevField => focused.set(field.prev(stage)),

                FormAction::MoveUp | FormAction::MoveDown => {
                    let up = action == FormAction::MoveUp;
                    let (cursor, len) = match field {
                        FormField::Engineer => (&mut engineer_cursor, view.engineers.len()),
                        FormField::Ticket => (&mut ticket_cursor, view.tickets.len()),
                        FormField::Uploads => (&mut upload_cursor, view.pending_uploads.len()),
                        FormField::Images => (&mut image_cursor, view.editable.image_urls.len()),
                        _ => return,
                    };
                    cursor.set(step_cursor(cursor.get(), len, up));
                }

                FormAction::Choose => match field {
                    FormField::Engineer => {
                        if let Some(option) = view.engineers.get(engineer_cursor.get()) {
                            ticket_cursor.set(0);
                            engineer_handler(option.value.clone());
                        }
                    }
                    FormField::Ticket => {
                        if let Some(option) = view.tickets.get(ticket_cursor.get()) {
                            upload_cursor.set(0);
                            image_cursor.set(0);
                            ticket_handler(option.value.clone());
                        }
                    }
                    _ => {}
                },

                FormAction::RemoveSelected => {
                    match field {
                        FormField::Uploads => {
                            if let Some(upload) = view.pending_uploads.get(upload_cursor.get()) {
                                form.detach_pending_file(&upload.name);
                            }
                        }
                        FormField::Images => form.detach_existing_image(image_cursor.get()),
                        _ => {}
                    }
                    let next = form.snapshot();
                    let uploads = next.pending_uploads.len();
                    let images = next.editable.image_urls.len();
                    upload_cursor.set(clamp_cursor(upload_cursor.get(), uploads));
                    image_cursor.set(clamp_cursor(image_cursor.get(), images));
                    snapshot.set(next);
                }

                FormAction::InsertChar(c) => {
                    match field {
                        FormField::Branch => {
                            let mut value = view.editable.company_branch.clone();
                            value.push(c);
                            form.set_company_branch(value);
                        }
                        FormField::Note => {
                            let mut value = view.editable.note.clone();
                            value.push(c);
                            form.set_note(value);
                        }
                        FormField::Uploads => {
                            let mut value = upload_input.to_string();
                            value.push(c);
                            upload_input.set(value);
                        }
                        _ => {}
                    }
                    snapshot.set(form.snapshot());
                }

                FormAction::Backspace => {
                    match field {
                        FormField::Branch => {
                            let mut value = view.editable.company_branch.clone();
                            value.pop();
                            form.set_company_branch(value);
                        }
                        FormField::Note => {
                            let mut value = view.editable.note.clone();
                            value.pop();
                            form.set_note(value);
                        }
                        FormField::Uploads => {
                            let mut value = upload_input.to_string();
                            value.pop();
                            upload_input.set(value);
                        }
                        _ => {}
                    }
                    snapshot.set(form.snapshot());
                }

                FormAction::Newline => {
                    form.set_note(format!("{}\n", view.editable.note));
                    snapshot.set(form.snapshot());
                }

                FormAction::CyclePrev | FormAction::CycleNext => {
                    let current = view.editable.note_priority;
                    form.set_note_priority(if action == FormAction::CycleNext {
                        current.next()
                    } else {
                        current.prev()
                    });
                    snapshot.set(form.snapshot());
                }

                FormAction::Toggle => {
                    match field {
                        FormField::Paused => form.toggle_paused(),
                        FormField::Completed => form.toggle_completed(),
                        _ => {}
                    }
                    snapshot.set(form.snapshot());
                }

                FormAction::AttachFiles => attach_handler(upload_input.to_string()),

                FormAction::Save => {
                    if view.can_submit() {
                        save_handler(());
                    }
                }
                FormAction::Delete => {
                    if view.can_submit() {
                        delete_handler(());
                    }
                }

                FormAction::Escape => {
                    if view.alert.is_some() {
                        form.dismiss_alert();
                    } else if input_error.read().is_some() {
                        input_error.set(None);
                    } else if stage == FormStage::TicketChosen && !view.is_busy() {
                        form.clear_ticket_selection();
                        focused.set(FormField::Ticket);
                    }
                    snapshot.set(form.snapshot());
                }
            }
        }
    });

    if should_exit.get() {
        system.exit();
    }

    let theme = theme();
    let view = snapshot.read().clone();
    let stage = view.stage();
    let field = focused.get().clamp(stage);
    if field != focused.get() {
        focused.set(field);
    }

    let list_rows = (height as usize / 6).max(3);
    let engineer_chosen = view
        .selected_engineer
        .as_ref()
        .and_then(|name| position_of(&view.engineers, name));
    let ticket_chosen = view
        .selected_ticket
        .as_ref()
        .and_then(|number| position_of(&view.tickets, number));

    let subtitle = match (&view.selected_engineer, &view.selected_ticket) {
        (Some(engineer), Some(ticket)) => Some(format!("{engineer} / #{ticket}")),
        (Some(engineer), None) => Some(engineer.clone()),
        _ => None,
    };

    let ticket_picker = (stage != FormStage::NoEngineer).then(|| {
        element! {
            View(width: 50pct) {
                OptionList(
                    label: "Ticket".to_string(),
                    items: labels(&view.tickets),
                    cursor: ticket_cursor.get(),
                    chosen: ticket_chosen,
                    has_focus: field == FormField::Ticket,
                    visible_rows: list_rows,
                    empty_text: Some("No tickets for this engineer".to_string()),
                )
            }
        }
    });

    let ticket_section = (stage == FormStage::TicketChosen).then(|| {
        let editable = &view.editable;
        let busy = view.busy;
        let (save_label, save_color) = match busy {
            Some(BusyAction::Saving) => ("Saving...", theme.text_dimmed),
            Some(_) => ("Save Changes", theme.text_dimmed),
            None => ("Save Changes", theme.success),
        };
        let (delete_label, delete_color) = match busy {
            Some(BusyAction::Deleting) => ("Deleting...", theme.text_dimmed),
            Some(_) => ("Delete Ticket", theme.text_dimmed),
            None => ("Delete Ticket", theme.error),
        };
        let pending: Vec<String> = view
            .pending_uploads
            .iter()
            .map(|u| format!("{} ({} bytes, {})", u.name, u.size(), u.content_type))
            .collect();
        let note_hint = view.note_created_display();

        element! {
            View(flex_direction: FlexDirection::Column, gap: 1, width: 100pct) {
                TextField(
                    label: "Company branch".to_string(),
                    value: editable.company_branch.clone(),
                    has_focus: field == FormField::Branch,
                )
                View(flex_direction: FlexDirection::Column) {
                    TextField(
                        label: "Note".to_string(),
                        value: editable.note.clone(),
                        has_focus: field == FormField::Note,
                        multiline: true,
                    )
                    #(note_hint.map(|hint| element! {
                        Text(content: format!("Note created at: {hint}"), color: theme.text_dimmed)
                    }))
                }
                View(flex_direction: FlexDirection::Row, gap: 4) {
                    Select(
                        label: Some("Priority"),
                        options: labels(&priority_options()),
                        selected_index: editable.note_priority.index(),
                        has_focus: field == FormField::Priority,
                        value_color: Some(theme.priority_color(editable.note_priority)),
                    )
                    Text(
                        content: checkbox("Paused", editable.paused),
                        color: theme.focus_color(field == FormField::Paused),
                    )
                    Text(
                        content: checkbox("Completed", editable.completed),
                        color: theme.focus_color(field == FormField::Completed),
                    )
                }
                TextField(
                    label: "Attach files (comma-separated paths)".to_string(),
                    value: upload_input.to_string(),
                    has_focus: field == FormField::Uploads,
                    placeholder: Some("./photo.jpg, ./report.pdf".to_string()),
                )
                OptionList(
                    label: "Pending uploads".to_string(),
                    items: pending,
                    cursor: upload_cursor.get(),
                    has_focus: field == FormField::Uploads,
                    visible_rows: list_rows,
                    empty_text: Some("No files attached".to_string()),
                )
                OptionList(
                    label: "Existing images".to_string(),
                    items: editable.image_urls.clone(),
                    cursor: image_cursor.get(),
                    has_focus: field == FormField::Images,
                    visible_rows: list_rows,
                    empty_text: Some("No images".to_string()),
                )
                View(flex_direction: FlexDirection::Row, gap: 2) {
                    Text(content: format!("[ {save_label} ]"), color: save_color, weight: Weight::Bold)
                    Text(content: format!("[ {delete_label} ]"), color: delete_color, weight: Weight::Bold)
                }
            }
        }
    });

    element! {
        View(
            width: 100pct,
            height: 100pct,
            flex_direction: FlexDirection::Column,
            background_color: theme.background,
        ) {
            Header(
                title: "ticketdesk".to_string(),
                subtitle: subtitle,
                source: props.source.clone(),
            )
            AlertBar(alert: view.alert.clone())
            #(input_error.read().clone().map(|message| element! {
                View(padding_left: 1) {
                    Text(content: message, color: theme.error)
                }
            }))
            View(
                flex_grow: 1.0,
                width: 100pct,
                padding: 1,
                flex_direction: FlexDirection::Column,
                gap: 1,
                overflow: Overflow::Hidden,
            ) {
                View(flex_direction: FlexDirection::Row, gap: 2, width: 100pct) {
                    View(width: 50pct) {
                        OptionList(
                            label: "Engineer".to_string(),
                            items: labels(&view.engineers),
                            cursor: engineer_cursor.get(),
                            chosen: engineer_chosen,
                            has_focus: field == FormField::Engineer,
                            visible_rows: list_rows,
                            empty_text: Some("No engineers found".to_string()),
                        )
                    }
                    #(ticket_picker)
                }
                #(ticket_section)
            }
            Footer(shortcuts: form_shortcuts(field, stage))
        }
    }
}
