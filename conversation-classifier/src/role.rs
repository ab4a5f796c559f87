use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::RawMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Role given to messages that match none of the role or type markers.
pub const UNKNOWN_ROLE_FALLBACK: Role = Role::User;

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// The `type` marker chat-panel bubbles use for this role.
    pub const fn bubble_type(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "ai",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides who authored a message. Explicit role markers win over numeric
/// type codes; anything unrecognised maps to [`UNKNOWN_ROLE_FALLBACK`].
pub fn classify_role(msg: &RawMessage) -> Role {
    let role_is =
        |name: &str| msg.str_field("role") == Some(name) || msg.context_str("role") == Some(name);

    if role_is("user") {
        Role::User
    } else if role_is("ai") {
        Role::Assistant
    } else if msg.has_code("type", 1) {
        Role::User
    } else if msg.has_code("type", 2) {
        Role::Assistant
    } else {
        UNKNOWN_ROLE_FALLBACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role_of(value: serde_json::Value) -> Role {
        classify_role(&RawMessage::new(value))
    }

    #[test]
    fn explicit_user_role_wins_over_everything() {
        assert_eq!(role_of(json!({ "role": "user", "type": 2 })), Role::User);
        assert_eq!(
            role_of(json!({ "role": "user", "context": { "role": "ai", "type": 2 } })),
            Role::User
        );
        assert_eq!(role_of(json!({ "context": { "role": "user" }, "type": 2 })), Role::User);
    }

    #[test]
    fn ai_role_maps_to_assistant() {
        assert_eq!(role_of(json!({ "role": "ai", "type": 1 })), Role::Assistant);
        assert_eq!(role_of(json!({ "context": { "role": "ai" } })), Role::Assistant);
    }

    #[test]
    fn numeric_type_codes_are_used_without_role() {
        assert_eq!(role_of(json!({ "type": 1 })), Role::User);
        assert_eq!(role_of(json!({ "type": 2 })), Role::Assistant);
        assert_eq!(role_of(json!({ "context": { "type": 2 } })), Role::Assistant);
        assert_eq!(role_of(json!({ "context": { "type": 1 } })), Role::User);
    }

    #[test]
    fn float_type_codes_match_integer_codes() {
        assert_eq!(role_of(json!({ "type": 2.0 })), Role::Assistant);
        assert_eq!(role_of(json!({ "context": { "type": 1.0 } })), Role::User);
        assert_eq!(role_of(json!({ "type": 2.5 })), UNKNOWN_ROLE_FALLBACK);
    }

    #[test]
    fn type_code_one_checked_before_two() {
        assert_eq!(role_of(json!({ "type": 2, "context": { "type": 1 } })), Role::User);
    }

    #[test]
    fn unknown_shapes_fall_back() {
        assert_eq!(role_of(json!({})), UNKNOWN_ROLE_FALLBACK);
        assert_eq!(role_of(json!({ "role": "system", "type": "2" })), UNKNOWN_ROLE_FALLBACK);
        assert_eq!(role_of(json!(null)), UNKNOWN_ROLE_FALLBACK);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Assistant).ok(), Some(json!("assistant")));
        assert_eq!(Role::Assistant.bubble_type(), "ai");
        assert_eq!(Role::User.to_string(), "user");
    }
}
