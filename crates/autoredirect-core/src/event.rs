use crate::error::EventError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context tag the host sends when an article is saved.
pub const ARTICLE_CONTEXT: &str = "com_content.article";

/// The fields of an article being saved that matter for redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingArticle {
    pub id: u64,
    pub alias: String,
}

impl IncomingArticle {
    pub fn new(id: u64, alias: impl Into<String>) -> Self {
        Self {
            id,
            alias: alias.into(),
        }
    }
}

impl TryFrom<&Map<String, Value>> for IncomingArticle {
    type Error = EventError;

    /// Reads `id` and `alias` from the field map submitted with a save.
    ///
    /// Form submissions often carry ids as strings, so a numeric string is
    /// accepted for `id`.
    fn try_from(fields: &Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get("id") {
            None | Some(Value::Null) => return Err(EventError::MissingField("id")),
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| EventError::InvalidField {
                field: "id",
                reason: format!("expected a non-negative integer, got {n}"),
            })?,
            Some(Value::String(s)) => s.trim().parse().map_err(|e| EventError::InvalidField {
                field: "id",
                reason: format!("'{s}': {e}"),
            })?,
            Some(other) => {
                return Err(EventError::InvalidField {
                    field: "id",
                    reason: format!("unexpected value {other}"),
                })
            }
        };

        let alias = match fields.get("alias") {
            None | Some(Value::Null) => return Err(EventError::MissingField("alias")),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(EventError::InvalidField {
                    field: "alias",
                    reason: format!("expected a string, got {other}"),
                })
            }
        };

        Ok(Self { id, alias })
    }
}

/// A "content about to be saved" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSaveEvent {
    /// Identifies the entity type being saved, e.g. [`ARTICLE_CONTEXT`].
    pub context: String,
    /// Whether the entity is being created rather than updated.
    pub is_new: bool,
    pub data: IncomingArticle,
}

impl ContentSaveEvent {
    pub fn new(context: impl Into<String>, is_new: bool, data: IncomingArticle) -> Self {
        Self {
            context: context.into(),
            is_new,
            data,
        }
    }

    /// An update of an existing article.
    pub fn article_update(id: u64, alias: impl Into<String>) -> Self {
        Self::new(ARTICLE_CONTEXT, false, IncomingArticle::new(id, alias))
    }

    /// Builds an event from the raw field map the host submits.
    pub fn from_fields(
        context: impl Into<String>,
        is_new: bool,
        fields: &Map<String, Value>,
    ) -> Result<Self, EventError> {
        Ok(Self::new(context, is_new, IncomingArticle::try_from(fields)?))
    }
}
