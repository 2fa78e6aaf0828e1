use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Discriminant for the two joke shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JokeKind {
    Single,
    Twopart,
}

impl JokeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JokeKind::Single => "single",
            JokeKind::Twopart => "twopart",
        }
    }
}

impl fmt::Display for JokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JokeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(JokeKind::Single),
            "twopart" => Ok(JokeKind::Twopart),
            other => Err(format!("unknown joke type: {other}")),
        }
    }
}

/// The joke text itself. One-liners carry `content`, two-part jokes carry
/// `setup` + `punchline`. The enum makes a mismatched shape unrepresentable.
///
/// Serializes to the `{"content"}` / `{"setup","punchline"}` JSON stored in
/// the `joke` jsonb column.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum JokePayload {
    Single { content: String },
    Twopart { setup: String, punchline: String },
}

impl JokePayload {
    pub fn kind(&self) -> JokeKind {
        match self {
            JokePayload::Single { .. } => JokeKind::Single,
            JokePayload::Twopart { .. } => JokeKind::Twopart,
        }
    }
}

/// A normalized joke as produced by a provider, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Joke {
    /// Upstream-assigned identifier, coerced to string when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(rename = "joke")]
    pub payload: JokePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_safe")]
    pub safe: bool,
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_safe() -> bool {
    true
}

fn default_lang() -> String {
    "en".to_string()
}

impl Joke {
    pub fn single(content: impl Into<String>) -> Self {
        Self::new(JokePayload::Single {
            content: content.into(),
        })
    }

    pub fn twopart(setup: impl Into<String>, punchline: impl Into<String>) -> Self {
        Self::new(JokePayload::Twopart {
            setup: setup.into(),
            punchline: punchline.into(),
        })
    }

    fn new(payload: JokePayload) -> Self {
        Self {
            external_id: None,
            payload,
            category: None,
            safe: default_safe(),
            lang: default_lang(),
        }
    }

    pub fn with_external_id(mut self, id: impl ToString) -> Self {
        self.external_id = Some(id.to_string());
        self
    }

    /// Set the category, normalized to lowercase.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_lowercase());
        self
    }

    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// The type tag, derived from the payload shape.
    pub fn kind(&self) -> JokeKind {
        self.payload.kind()
    }
}

/// A joke tagged with the base URL of the provider it came from.
/// This is both the manager's output and the persistence layer's input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourcedJoke {
    #[serde(flatten)]
    pub joke: Joke,
    pub provider: String,
}

/// A persisted joke row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JokeRecord {
    pub id: Uuid,
    pub external_id: Option<String>,
    /// Raw jsonb payload as stored (`{"content"}` or `{"setup","punchline"}`).
    pub joke: serde_json::Value,
    pub category: Option<String>,
    pub kind: Option<JokeKind>,
    pub safe: bool,
    pub lang: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identifying columns of a row the bulk insert actually created.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InsertedJoke {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key of an input joke the bulk insert skipped as a conflict.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DuplicateJoke {
    pub external_id: Option<String>,
    pub provider: String,
}

/// Result of a bulk upsert: every input classified as inserted or duplicate.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchInsertOutcome {
    pub inserted: Vec<InsertedJoke>,
    pub duplicates: Vec<DuplicateJoke>,
    pub total_processed: usize,
}

impl BatchInsertOutcome {
    pub fn empty() -> Self {
        Self {
            inserted: Vec::new(),
            duplicates: Vec::new(),
            total_processed: 0,
        }
    }
}

/// Optional equality filters for joke listing queries.
#[derive(Debug, Clone, Default)]
pub struct JokeFilter {
    pub category: Option<String>,
    pub kind: Option<JokeKind>,
    pub provider: Option<String>,
    pub safe: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Global aggregate counts over the jokes table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JokeStats {
    pub total_jokes: i64,
    pub total_providers: i64,
    pub total_categories: i64,
    pub single_jokes: i64,
    pub twopart_jokes: i64,
    pub safe_jokes: i64,
    pub unsafe_jokes: i64,
}

/// Per-provider aggregate counts, ordered by descending joke count.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderStats {
    pub provider: String,
    pub joke_count: i64,
    pub single_count: i64,
    pub twopart_count: i64,
    pub safe_count: i64,
    pub unsafe_count: i64,
    pub last_added: DateTime<Utc>,
}
