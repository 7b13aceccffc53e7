use crate::error::Result;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// HTTP status emitted for redirects created on alias changes.
pub const PERMANENT_REDIRECT: u16 = 301;

/// A stored redirect row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRecord {
    pub id: u64,
    /// The legacy path that should no longer resolve directly.
    pub old_url: String,
    /// The path visitors are sent to instead.
    pub new_url: String,
    pub published: bool,
    pub status_code: u16,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl RedirectRecord {
    /// Returns `true` if the row sends a path to itself.
    pub fn is_self_redirect(&self) -> bool {
        self.old_url == self.new_url
    }
}

/// A redirect row that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRedirect {
    pub old_url: String,
    pub new_url: String,
    pub published: bool,
    pub status_code: u16,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl NewRedirect {
    /// A published 301 redirect stamped with `now`.
    pub fn permanent(
        old_url: impl Into<String>,
        new_url: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            old_url: old_url.into(),
            new_url: new_url.into(),
            published: true,
            status_code: PERMANENT_REDIRECT,
            created_at: now,
            modified_at: now,
        }
    }
}

/// The URL column of a redirect row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectField {
    OldUrl,
    NewUrl,
}

impl RedirectField {
    /// Column name in the `redirect_links` table.
    pub fn column(self) -> &'static str {
        match self {
            RedirectField::OldUrl => "old_url",
            RedirectField::NewUrl => "new_url",
        }
    }

    /// Returns the value of this column in `record`.
    pub fn value_of(self, record: &RedirectRecord) -> &str {
        match self {
            RedirectField::OldUrl => &record.old_url,
            RedirectField::NewUrl => &record.new_url,
        }
    }
}

impl Display for RedirectField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[async_trait]
pub trait RedirectRepository: Send + Sync + 'static {
    /// Removes every row whose `old_url` equals `old_url`.
    /// Returns the number of removed rows.
    async fn delete_by_old_url(&self, old_url: &str) -> Result<u64>;

    /// Rewrites `field` to `replacement` on every row where `field` equals `current`,
    /// refreshing `modified_at`. Returns the number of rewritten rows.
    async fn update_redirects(
        &self,
        field: RedirectField,
        current: &str,
        replacement: &str,
        now: Timestamp,
    ) -> Result<u64>;

    /// Stores a new row. No uniqueness is enforced on either URL.
    async fn insert(&self, redirect: NewRedirect) -> Result<()>;

    /// Removes every row where `old_url == new_url`.
    /// Returns the number of removed rows.
    async fn delete_self_redirects(&self) -> Result<u64>;

    /// Returns every stored row ordered by id.
    async fn list(&self) -> Result<Vec<RedirectRecord>>;

    /// Returns the rows whose `old_url` equals `old_url`, ordered by id.
    async fn find_by_old_url(&self, old_url: &str) -> Result<Vec<RedirectRecord>>;
}
