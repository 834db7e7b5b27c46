//! Optimistic enable/disable as an explicit state machine:
//! `idle -> pending(prior) -> {committed | rolled-back}`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Nothing was applied, e.g. the install is not in local state.
    Idle,
    /// Applied locally, request outstanding.
    Pending { prior: bool, requested: bool },
    /// The server accepted the change; `enabled` is what it returned.
    Committed { enabled: bool },
    /// The request failed and the flag was put back to `restored`.
    RolledBack { restored: bool },
}

/// One in-flight toggle. The prior value is captured before the local
/// write, so rolling back never has to guess it from the requested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    call_id: u64,
    install_id: String,
    prior: bool,
    requested: bool,
}

impl PendingToggle {
    pub fn begin(call_id: u64, install_id: impl Into<String>, prior: bool, requested: bool) -> Self {
        Self {
            call_id,
            install_id: install_id.into(),
            prior,
            requested,
        }
    }

    pub fn call_id(&self) -> u64 {
        self.call_id
    }

    pub fn install_id(&self) -> &str {
        &self.install_id
    }

    pub fn prior(&self) -> bool {
        self.prior
    }

    pub fn state(&self) -> ToggleState {
        ToggleState::Pending {
            prior: self.prior,
            requested: self.requested,
        }
    }

    pub fn commit(self, server_enabled: bool) -> ToggleState {
        ToggleState::Committed {
            enabled: server_enabled,
        }
    }

    pub fn roll_back(self) -> ToggleState {
        ToggleState::RolledBack {
            restored: self.prior,
        }
    }
}

/// What a `set_enabled` call ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub call_id: u64,
    pub state: ToggleState,
}
