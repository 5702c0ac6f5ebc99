//! Declarative builder for footer shortcuts

use super::Shortcut;

#[derive(Default)]
pub struct ShortcutsBuilder {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab / Shift-Tab between fields
    pub fn with_field_navigation(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("Tab", "Next Field"));
        self.shortcuts.push(Shortcut::new("S-Tab", "Prev Field"));
        self
    }

    /// j/k within a list
    pub fn with_list_navigation(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("j/k", "Up/Down"));
        self
    }

    /// Save, delete and deselect, available once a ticket is chosen
    pub fn with_ticket_actions(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("C-s", "Save"));
        self.shortcuts.push(Shortcut::new("C-d", "Delete"));
        self.shortcuts.push(Shortcut::new("Esc", "Deselect"));
        self
    }

    pub fn with_quit(mut self) -> Self {
        self.shortcuts.push(Shortcut::new("C-q", "Quit"));
        self
    }

    pub fn add(mut self, key: &str, description: &str) -> Self {
        self.shortcuts.push(Shortcut::new(key, description));
        self
    }

    pub fn build(self) -> Vec<Shortcut> {
        self.shortcuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormStage;
    use crate::tui::components::form_shortcuts;
    use crate::tui::keymap::FormField;

    fn keys(shortcuts: &[Shortcut]) -> Vec<&str> {
        shortcuts.iter().map(|s| s.key.as_str()).collect()
    }

    #[test]
    fn test_builder_order() {
        let shortcuts = ShortcutsBuilder::new()
            .with_field_navigation()
            .add("x", "Remove")
            .with_quit()
            .build();
        assert_eq!(keys(&shortcuts), vec!["Tab", "S-Tab", "x", "C-q"]);
    }

    #[test]
    fn test_ticket_actions_only_with_ticket() {
        let without = form_shortcuts(FormField::Engineer, FormStage::EngineerChosen);
        assert!(!keys(&without).contains(&"C-s"));

        let with = form_shortcuts(FormField::Note, FormStage::TicketChosen);
        let with_keys = keys(&with);
        assert!(with_keys.contains(&"C-s"));
        assert!(with_keys.contains(&"C-d"));
        assert_eq!(with_keys.last(), Some(&"C-q"));
    }
}
