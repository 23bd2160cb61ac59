//! Session store for the protocol dispatcher.
//!
//! Sessions are created when an initialization request arrives without a
//! session id and removed when the transport closes. Only the dispatcher
//! touches this map; each active id maps to exactly one handler instance.

use crate::mcp::McpHandler;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<McpHandler>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a freshly minted session id.
    pub fn create(&self, handler: Arc<McpHandler>) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(id.clone(), handler);
        info!("session created: {id}");
        id
    }

    /// Look up the handler for an active session.
    pub fn get(&self, id: &str) -> Option<Arc<McpHandler>> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(id)
            .cloned()
    }

    /// Drop a session; the id immediately becomes unknown again.
    /// Returns whether the id was active.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .expect("session store lock poisoned")
            .remove(id)
            .is_some();
        if removed {
            info!("session closed: {id}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
