//! Yes/no gate in front of destructive actions.
//!
//! The gate carries the pending action as a value. Confirming hands the action
//! back to the caller and leaves the gate open in a loading state until the
//! caller closes it; cancelling closes it and hands the action back for
//! cleanup. While loading, every input is ignored.

/// Input the gate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateInput {
    Confirm,
    Cancel,
    /// Click outside the dialog; same as cancel.
    Backdrop,
    /// Click inside the dialog body; ignored.
    Body,
}

impl GateInput {
    /// Map a terminal key to a gate input: `y` confirms; `n`, `c` and Esc cancel.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "y" | "Y" | "yes" => Some(GateInput::Confirm),
            "n" | "N" | "no" | "c" | "C" | "\u{1b}" | "esc" => Some(GateInput::Cancel),
            _ => None,
        }
    }
}

/// What a gate input resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<A> {
    Confirmed(A),
    Cancelled(A),
    Ignored,
}

/// State for the confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialogState<A> {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Set while the confirmed action runs.
    pub loading: bool,
    /// The action to perform if confirmed
    pub action: A,
}

#[derive(Debug, Clone)]
pub struct ConfirmGate<A> {
    dialog: Option<ConfirmDialogState<A>>,
}

impl<A> Default for ConfirmGate<A> {
    fn default() -> Self {
        Self { dialog: None }
    }
}

impl<A: Clone> ConfirmGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate for `action`, replacing anything not yet confirmed.
    ///
    /// Returns `false` without changing anything while a confirmed action is
    /// still running.
    pub fn open(&mut self, title: impl Into<String>, message: impl Into<String>, action: A) -> bool {
        if self.is_loading() {
            return false;
        }
        self.dialog = Some(ConfirmDialogState {
            title: title.into(),
            message: message.into(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            loading: false,
            action,
        });
        true
    }

    /// Override the button labels of the open dialog.
    pub fn set_labels(&mut self, confirm: impl Into<String>, cancel: impl Into<String>) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.confirm_text = confirm.into();
            dialog.cancel_text = cancel.into();
        }
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.dialog.as_ref().is_some_and(|d| d.loading)
    }

    pub fn dialog(&self) -> Option<&ConfirmDialogState<A>> {
        self.dialog.as_ref()
    }

    pub fn set_loading(&mut self, loading: bool) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.loading = loading;
        }
    }

    pub fn close(&mut self) -> Option<A> {
        self.dialog.take().map(|d| d.action)
    }

    pub fn handle(&mut self, input: GateInput) -> GateOutcome<A> {
        let Some(dialog) = self.dialog.as_ref() else {
            return GateOutcome::Ignored;
        };
        if dialog.loading {
            return GateOutcome::Ignored;
        }
        match input {
            GateInput::Confirm => GateOutcome::Confirmed(dialog.action.clone()),
            GateInput::Cancel | GateInput::Backdrop => match self.close() {
                Some(action) => GateOutcome::Cancelled(action),
                None => GateOutcome::Ignored,
            },
            GateInput::Body => GateOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_gate() -> ConfirmGate<&'static str> {
        let mut gate = ConfirmGate::new();
        assert!(gate.open("Delete role", "Delete \"Editor\"?", "7"));
        gate
    }

    #[test]
    fn test_closed_gate_ignores_input() {
        let mut gate: ConfirmGate<u32> = ConfirmGate::new();
        assert_eq!(gate.handle(GateInput::Confirm), GateOutcome::Ignored);
        assert!(!gate.is_open());
    }

    #[test]
    fn test_confirm_keeps_gate_open() {
        let mut gate = open_gate();
        assert_eq!(gate.handle(GateInput::Confirm), GateOutcome::Confirmed("7"));
        assert!(gate.is_open());
    }

    #[test]
    fn test_cancel_and_backdrop_close() {
        let mut gate = open_gate();
        assert_eq!(gate.handle(GateInput::Cancel), GateOutcome::Cancelled("7"));
        assert!(!gate.is_open());

        let mut gate = open_gate();
        assert_eq!(gate.handle(GateInput::Backdrop), GateOutcome::Cancelled("7"));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_body_click_is_ignored() {
        let mut gate = open_gate();
        assert_eq!(gate.handle(GateInput::Body), GateOutcome::Ignored);
        assert!(gate.is_open());
    }

    #[test]
    fn test_loading_ignores_everything() {
        let mut gate = open_gate();
        gate.set_loading(true);
        for input in [
            GateInput::Confirm,
            GateInput::Cancel,
            GateInput::Backdrop,
            GateInput::Body,
        ] {
            assert_eq!(gate.handle(input), GateOutcome::Ignored);
        }
        assert!(gate.is_open());
        assert!(!gate.open("Delete role", "again?", "8"));
        assert_eq!(gate.dialog().unwrap().action, "7");

        assert_eq!(gate.close(), Some("7"));
        assert!(!gate.is_open());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(GateInput::from_key("y"), Some(GateInput::Confirm));
        assert_eq!(GateInput::from_key("Y"), Some(GateInput::Confirm));
        assert_eq!(GateInput::from_key("n"), Some(GateInput::Cancel));
        assert_eq!(GateInput::from_key("c"), Some(GateInput::Cancel));
        assert_eq!(GateInput::from_key("\u{1b}"), Some(GateInput::Cancel));
        assert_eq!(GateInput::from_key("x"), None);
    }

    #[test]
    fn test_custom_labels() {
        let mut gate = open_gate();
        gate.set_labels("Delete", "Keep");
        let dialog = gate.dialog().unwrap();
        assert_eq!(dialog.confirm_text, "Delete");
        assert_eq!(dialog.cancel_text, "Keep");
        assert!(!dialog.loading);
    }
}
