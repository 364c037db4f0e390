//! The command issuer abstraction
//!
//! An issuer is whoever sent a command line: a player, the console, an RCON
//! session. The framework only needs to ask it a handful of questions and
//! hand it messages; everything else is platform specific.

use std::sync::Arc;

use uuid::Uuid;

/// Someone that can issue commands and receive replies
pub trait CommandIssuer: Send + Sync {
    /// Whether this issuer is an in-game player
    fn is_player(&self) -> bool;

    /// Stable identity of this issuer. The console uses [`Uuid::nil`].
    fn unique_id(&self) -> Uuid;

    /// Check a single permission node
    fn has_permission(&self, permission: &str) -> bool;

    /// Deliver one line of text to the issuer
    fn send_message(&self, message: &str);

    /// Deliver one line of error text. Defaults to [`send_message`](Self::send_message).
    fn send_error(&self, message: &str) {
        self.send_message(message);
    }

    /// Deliver one line of informational text. Defaults to [`send_message`](Self::send_message).
    fn send_info(&self, message: &str) {
        self.send_message(message);
    }
}

/// Shared issuer handle as passed through dispatch and bound to issuer parameters
pub type IssuerRef = Arc<dyn CommandIssuer>;

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::*;
    use crate::permissions::{PermissionSet, WILDCARD};

    /// Issuer that records every message it receives
    pub struct RecordingIssuer {
        pub id: Uuid,
        pub player: bool,
        pub permissions: PermissionSet,
        pub messages: Mutex<Vec<String>>,
    }

    impl RecordingIssuer {
        pub fn console() -> Arc<Self> {
            let mut permissions = PermissionSet::new();
            permissions.add(&[WILDCARD]);
            Arc::new(Self {
                id: Uuid::nil(),
                player: false,
                permissions,
                messages: Mutex::new(Vec::new()),
            })
        }

        pub fn player(nodes: &[&str]) -> Arc<Self> {
            let mut permissions = PermissionSet::new();
            permissions.add(nodes);
            Arc::new(Self {
                id: Uuid::new_v4(),
                player: true,
                permissions,
                messages: Mutex::new(Vec::new()),
            })
        }

        pub fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.messages.lock())
        }
    }

    impl CommandIssuer for RecordingIssuer {
        fn is_player(&self) -> bool {
            self.player
        }

        fn unique_id(&self) -> Uuid {
            self.id
        }

        fn has_permission(&self, permission: &str) -> bool {
            self.permissions.has(permission)
        }

        fn send_message(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }
}
