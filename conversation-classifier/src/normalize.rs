use serde::{Deserialize, Serialize};

use crate::{
    message::{extract_content, RawMessage},
    role::{classify_role, Role},
};

/// A message reduced to who said it and what was said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

pub fn normalize_message(msg: &RawMessage) -> NormalizedMessage {
    NormalizedMessage {
        role: classify_role(msg),
        content: extract_content(msg),
        timestamp: msg.timestamp(),
    }
}

/// One bubble per message, in the original order. Empty messages are kept.
pub fn normalize(conversation: &[RawMessage]) -> Vec<NormalizedMessage> {
    conversation.iter().map(normalize_message).collect()
}
