//! Reusable components of the ticket form screen

pub mod alert;
pub mod footer;
pub mod header;
pub mod option_list;
pub mod select;
pub mod shortcuts;
pub mod text_field;

pub use alert::{AlertBar, AlertBarProps};
pub use footer::{Footer, FooterProps, Shortcut, form_shortcuts};
pub use header::{Header, HeaderProps};
pub use option_list::{OptionList, OptionListProps, window_start};
pub use select::{Select, SelectProps, Selectable};
pub use shortcuts::ShortcutsBuilder;
pub use text_field::{TextField, TextFieldProps};
