use ahash::AHashMap;
use crossbeam_channel::Sender;

use crate::types::Sources;

pub type SessionId = u64;

/// Outbound side of a control session. Lines are sent without a trailing
/// newline.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: Sender<String>,
}

impl SessionHandle {
    pub fn new(id: SessionId, tx: Sender<String>) -> Self {
        Self { id, tx }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a line for the session. Returns `false` once the session's
    /// writer is gone.
    pub fn send(&self, line: impl Into<String>) -> bool {
        self.tx.send(line.into()).is_ok()
    }
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub handle: SessionHandle,
    pub locked: Sources,
    pub observed: Sources,
}

/// Live sessions and what each of them intercepts.
#[derive(Debug, Default)]
pub(crate) struct SessionTable {
    sessions: AHashMap<SessionId, SessionState>,
}

impl SessionTable {
    pub fn insert(&mut self, handle: SessionHandle) {
        self.sessions.insert(
            handle.id(),
            SessionState {
                handle,
                locked: Sources::empty(),
                observed: Sources::empty(),
            },
        );
    }

    pub fn get(&self, id: SessionId) -> Option<&SessionState> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut SessionState> {
        self.sessions.get_mut(&id)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<SessionState> {
        self.sessions.remove(&id)
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &SessionState> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
