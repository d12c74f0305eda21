use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one conversation.
///
/// Only equality matters: the id is the sole key into the stop-flag map and
/// the routing key for status events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh time-ordered id for a new conversation.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for ConversationId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_and_string_forms_are_equal() {
        let uuid = Uuid::now_v7();
        assert_eq!(ConversationId::from(uuid), ConversationId::new(uuid.to_string()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ConversationId::from("abc-1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc-1\""));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(ConversationId::generate(), ConversationId::generate());
    }
}
