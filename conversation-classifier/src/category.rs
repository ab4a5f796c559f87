use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::{ClassificationSink, ClassificationTrace, NoopSink},
    message::{derive_title, RawMessage},
};

/// Which editor surface a conversation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chat,
    Composer,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Composer => "composer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule gets to look at: the derived title and the first message.
pub struct RuleInput<'a> {
    pub title: &'a str,
    pub first: &'a RawMessage,
}

/// One entry of the ordered rule table.
pub struct CategoryRule {
    pub name: &'static str,
    pub matches: fn(&RuleInput<'_>) -> bool,
    pub category: Category,
}

/// Outcome of running the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub category: Category,
    pub rule: &'static str,
}

pub const DEFAULT_CATEGORY: Category = Category::Chat;

const DEFAULT_RULE: &str = "default";

/// Rules evaluated top to bottom; the first match decides.
///
/// Because `title-without-hash-prefix` catches every title that does not
/// start with `#`, the source/type rules below `title-hash-prefix` never fire
/// in practice. They stay in the table so the ordering can be changed without
/// rewriting them.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "title-testing-new-log",
        matches: title_is_new_log_test,
        category: Category::Chat,
    },
    CategoryRule {
        name: "title-legit-question",
        matches: title_asks_if_legit,
        category: Category::Chat,
    },
    CategoryRule {
        name: "title-without-hash-prefix",
        matches: title_lacks_hash_prefix,
        category: Category::Chat,
    },
    CategoryRule {
        name: "title-hash-prefix",
        matches: title_has_hash_prefix,
        category: Category::Composer,
    },
    CategoryRule {
        name: "chat-source",
        matches: from_chat_source,
        category: Category::Chat,
    },
    CategoryRule {
        name: "editor-source",
        matches: from_editor_source,
        category: Category::Composer,
    },
];

fn title_is_new_log_test(input: &RuleInput<'_>) -> bool {
    input.title.starts_with("testing opening new log")
}

fn title_asks_if_legit(input: &RuleInput<'_>) -> bool {
    input.title.contains(r#"does this look "legit""#)
}

fn title_lacks_hash_prefix(input: &RuleInput<'_>) -> bool {
    !input.title.starts_with('#')
}

fn title_has_hash_prefix(input: &RuleInput<'_>) -> bool {
    input.title.starts_with('#')
}

fn from_source(input: &RuleInput<'_>, source: &str) -> bool {
    input.first.str_field("source") == Some(source) || input.first.context_str("type") == Some(source)
}

fn from_chat_source(input: &RuleInput<'_>) -> bool {
    from_source(input, "chat")
}

fn from_editor_source(input: &RuleInput<'_>) -> bool {
    from_source(input, "editor")
}

/// Runs the rule table against an already derived title.
pub fn decide(title: &str, first: &RawMessage) -> Decision {
    let input = RuleInput { title, first };
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(&input))
        .map_or(
            Decision {
                category: DEFAULT_CATEGORY,
                rule: DEFAULT_RULE,
            },
            |rule| Decision {
                category: rule.category,
                rule: rule.name,
            },
        )
}

/// Classifies a conversation by its first message.
///
/// Callers are expected to skip empty conversations; if one is passed anyway
/// the result is [`DEFAULT_CATEGORY`].
pub fn classify(conversation: &[RawMessage]) -> Category {
    classify_with(conversation, &NoopSink)
}

/// Like [`classify`], reporting the decision to `sink`.
pub fn classify_with<S>(conversation: &[RawMessage], sink: &S) -> Category
where
    S: ClassificationSink + ?Sized,
{
    let Some(first) = conversation.first() else {
        return DEFAULT_CATEGORY;
    };

    let title = derive_title(first);
    let decision = decide(&title, first);
    sink.record(&ClassificationTrace::new(first, &title, decision));
    decision.category
}

/// Whether the first message was started with files attached, which the log
/// listing treats as the mark of an editor-bound composer session.
pub fn has_file_selections(first: &RawMessage) -> bool {
    first.has_context_selection("fileSelections")
}
