//! Classification and normalization of editor conversation records.
//!
//! Conversations come out of the editor's key-value stores as loosely shaped
//! JSON. Everything in this crate is a pure function over those values: it
//! decides whether a conversation belongs to the chat panel or the composer,
//! derives a display title and flattens each message into a role-tagged bubble.

pub mod category;
pub mod diagnostics;
pub mod message;
pub mod normalize;
pub mod role;

pub use category::{
    classify, classify_with, decide, has_file_selections, Category, CategoryRule, Decision,
    CATEGORY_RULES, DEFAULT_CATEGORY,
};
pub use diagnostics::{ClassificationSink, ClassificationTrace, NoopSink, TracingSink};
pub use message::{derive_title, extract_content, RawMessage, UNTITLED_CHAT};
pub use normalize::{normalize, normalize_message, NormalizedMessage};
pub use role::{classify_role, Role, UNKNOWN_ROLE_FALLBACK};
