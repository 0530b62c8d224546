//! A minimal [`crate::ObservedEvent`] that maps an arbitrary
//! `(role, agent_id, content)` triple straight through. This is the adapter
//! example programs and this crate's own tests use when they don't need a
//! real host framework's event shape.

use crate::ObservedEvent;

#[derive(Debug, Clone)]
pub struct GenericTurnAdapter {
    role: String,
    agent_id: String,
    content: String,
}

impl GenericTurnAdapter {
    pub fn new(role: impl Into<String>, agent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            agent_id: agent_id.into(),
            content: content.into(),
        }
    }
}

impl ObservedEvent for GenericTurnAdapter {
    fn role(&self) -> &str {
        &self.role
    }

    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn content(&self) -> &str {
        &self.content
    }
}
