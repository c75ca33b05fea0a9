#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::AccountInfo;

/// Connection and keyring state for the current browser session.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub connection_status: ConnectionStatus,
    /// Bumped on every `session:connected`; subscriptions restart when it moves.
    pub connection_epoch: u64,
    pub client_id: Option<String>,
    pub accounts: Vec<AccountInfo>,
    /// Bumped whenever the keyring listing changes.
    pub keyring_rev: u64,
    /// Address of the signing account.
    pub current_account: Option<String>,
}

/// WebSocket connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl SessionState {
    pub fn connected(&mut self, client_id: Option<String>) {
        self.connection_status = ConnectionStatus::Connected;
        self.connection_epoch += 1;
        self.client_id = client_id;
    }

    pub fn disconnected(&mut self) {
        self.connection_status = ConnectionStatus::Disconnected;
        self.client_id = None;
    }

    /// Replace the keyring listing. The current account survives when it is
    /// still listed; otherwise the first account becomes current.
    pub fn set_accounts(&mut self, accounts: Vec<AccountInfo>) {
        if accounts == self.accounts {
            return;
        }
        let keep = self
            .current_account
            .as_deref()
            .is_some_and(|current| accounts.iter().any(|a| a.address == current));
        if !keep {
            self.current_account = accounts.first().map(|a| a.address.clone());
        }
        self.accounts = accounts;
        self.keyring_rev += 1;
    }

    /// Switch the signing account. Returns `false` for unknown addresses.
    pub fn select_account(&mut self, address: &str) -> bool {
        if !self.accounts.iter().any(|a| a.address == address) {
            return false;
        }
        self.current_account = Some(address.to_owned());
        true
    }

    #[must_use]
    pub fn current_address(&self) -> Option<&str> {
        self.current_account.as_deref()
    }

    /// Key the storage subscriptions are scoped to: a new connection or a
    /// new keyring invalidates them.
    #[must_use]
    pub fn subscription_key(&self) -> (u64, u64) {
        (self.connection_epoch, self.keyring_rev)
    }
}
