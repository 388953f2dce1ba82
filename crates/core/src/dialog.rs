//! Create/edit dialog state.
//!
//! At most one dialog is open; opening another one replaces it silently.
//! Dialogs opened "dismissibly" arm a [`DismissHook`] so an external cancel
//! signal (a mobile back gesture) and the explicit close button behave the
//! same way.

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialog<Id> {
    Closed,
    Open { mode: DialogMode, target: Option<Id> },
}

/// Identifies one opening of a dialog. Reopening a dialog of the same kind
/// issues a new ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogTicket(u64);

/// Bridge to whatever external cancel signal can dismiss a dialog.
///
/// `arm` runs when a dismissible dialog opens (e.g. push a synthetic history
/// entry); `release` runs when it is closed explicitly (pop that entry).
pub trait DismissHook: Send + Sync {
    fn arm(&self);
    fn release(&self);
}

pub struct DialogState<Id> {
    current: Dialog<Id>,
    hook: Option<Arc<dyn DismissHook>>,
    armed: bool,
    opened: u64,
}

impl<Id> Default for DialogState<Id> {
    fn default() -> Self {
        Self {
            current: Dialog::Closed,
            hook: None,
            armed: false,
            opened: 0,
        }
    }
}

impl<Id: fmt::Debug> fmt::Debug for DialogState<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogState")
            .field("current", &self.current)
            .field("has_hook", &self.hook.is_some())
            .field("armed", &self.armed)
            .field("opened", &self.opened)
            .finish()
    }
}

impl<Id: Copy> DialogState<Id> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dismiss_hook(mut self, hook: Arc<dyn DismissHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    #[must_use]
    pub fn current(&self) -> Dialog<Id> {
        self.current
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.current, Dialog::Open { .. })
    }

    #[must_use]
    pub fn mode(&self) -> Option<DialogMode> {
        match self.current {
            Dialog::Open { mode, .. } => Some(mode),
            Dialog::Closed => None,
        }
    }

    /// Entity being edited, if the edit dialog is open.
    #[must_use]
    pub fn edit_target(&self) -> Option<Id> {
        match self.current {
            Dialog::Open {
                mode: DialogMode::Edit,
                target,
            } => target,
            _ => None,
        }
    }

    /// Whether the dismiss hook is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Ticket of the dialog currently open.
    #[must_use]
    pub fn ticket(&self) -> Option<DialogTicket> {
        self.is_open().then_some(DialogTicket(self.opened))
    }

    pub fn open_create(&mut self) {
        self.opened += 1;
        self.current = Dialog::Open {
            mode: DialogMode::Create,
            target: None,
        };
    }

    pub fn open_edit(&mut self, id: Id) {
        self.opened += 1;
        self.current = Dialog::Open {
            mode: DialogMode::Edit,
            target: Some(id),
        };
    }

    pub fn open_create_dismissible(&mut self) {
        self.open_create();
        self.arm();
    }

    pub fn open_edit_dismissible(&mut self, id: Id) {
        self.open_edit(id);
        self.arm();
    }

    /// Explicit close. Releases the hook if this dialog armed it.
    pub fn close(&mut self) {
        self.current = Dialog::Closed;
        if self.armed {
            self.armed = false;
            if let Some(hook) = &self.hook {
                hook.release();
            }
        }
    }

    /// Closes the dialog only if it is still the one `ticket` was taken
    /// from. Returns whether it closed.
    pub fn close_if_current(&mut self, ticket: DialogTicket) -> bool {
        if self.ticket() != Some(ticket) {
            return false;
        }
        self.close();
        true
    }

    /// The external cancel signal fired; it already consumed whatever the
    /// hook armed, so only the state is reset.
    pub fn external_cancel(&mut self) {
        self.current = Dialog::Closed;
        self.armed = false;
    }

    fn arm(&mut self) {
        // a replaced dialog reuses the entry armed by its predecessor
        if self.armed {
            return;
        }
        if let Some(hook) = &self.hook {
            hook.arm();
            self.armed = true;
        }
    }
}
