// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return
// actions. App just holds Option<Modal>, input routing acts on the
// returned ModalAction.

use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug, Clone)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the modal
    Close,
}

/// Available modal types
#[derive(Debug, Clone)]
pub enum Modal {
    /// Help overlay - slash commands and keys
    Help,
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_closes_on_escape_and_enter() {
        let mut modal = Modal::help();
        assert!(matches!(modal.handle_input(KeyCode::Esc), ModalAction::Close));
        assert!(matches!(
            modal.handle_input(KeyCode::Enter),
            ModalAction::Close
        ));
    }

    #[test]
    fn help_absorbs_other_keys() {
        let mut modal = Modal::help();
        assert!(matches!(
            modal.handle_input(KeyCode::Char('x')),
            ModalAction::None
        ));
    }
}
