use async_trait::async_trait;
use autoredirect_core::error::Result;
use autoredirect_core::{
    ArticleRepository, ArticleSnapshot, NewRedirect, RedirectField, RedirectRecord,
    RedirectRepository,
};
use dashmap::DashMap;
use jiff::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// In-memory stand-in for the content and redirect tables.
///
/// Redirect rows are keyed by a generated id so that, as in the SQL table,
/// several rows may share the same `old_url`. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    articles: Arc<DashMap<u64, ArticleSnapshot>>,
    redirects: Arc<DashMap<u64, RedirectRecord>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryRepository {
    /// Creates an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces an article.
    pub fn insert_article(&self, article: ArticleSnapshot) {
        self.articles.insert(article.id, article);
    }

    fn sorted(mut rows: Vec<RedirectRecord>) -> Vec<RedirectRecord> {
        rows.sort_by_key(|row| row.id);
        rows
    }
}

#[async_trait]
impl ArticleRepository for InMemoryRepository {
    async fn find_article(&self, id: u64) -> Result<Option<ArticleSnapshot>> {
        Ok(self.articles.get(&id).map(|entry| entry.clone()))
    }

    async fn update_alias(&self, id: u64, alias: &str) -> Result<bool> {
        let Some(mut article) = self.articles.get_mut(&id) else {
            return Ok(false);
        };
        article.alias = alias.to_string();
        Ok(true)
    }
}

#[async_trait]
impl RedirectRepository for InMemoryRepository {
    async fn delete_by_old_url(&self, old_url: &str) -> Result<u64> {
        let mut removed = 0;
        self.redirects.retain(|_, row| {
            let keep = row.old_url != old_url;
            if !keep {
                removed += 1;
            }
            keep
        });
        trace!(old_url, rows = removed, "deleted redirects by old url");
        Ok(removed)
    }

    async fn update_redirects(
        &self,
        field: RedirectField,
        current: &str,
        replacement: &str,
        now: Timestamp,
    ) -> Result<u64> {
        let mut updated = 0;
        for mut row in self.redirects.iter_mut() {
            if field.value_of(&row) != current {
                continue;
            }
            match field {
                RedirectField::OldUrl => row.old_url = replacement.to_string(),
                RedirectField::NewUrl => row.new_url = replacement.to_string(),
            }
            row.modified_at = now;
            updated += 1;
        }
        trace!(%field, current, replacement, rows = updated, "updated redirects");
        Ok(updated)
    }

    async fn insert(&self, redirect: NewRedirect) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.redirects.insert(
            id,
            RedirectRecord {
                id,
                old_url: redirect.old_url,
                new_url: redirect.new_url,
                published: redirect.published,
                status_code: redirect.status_code,
                created_at: redirect.created_at,
                modified_at: redirect.modified_at,
            },
        );
        Ok(())
    }

    async fn delete_self_redirects(&self) -> Result<u64> {
        let mut removed = 0;
        self.redirects.retain(|_, row| {
            let keep = !row.is_self_redirect();
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<RedirectRecord>> {
        let rows = self.redirects.iter().map(|row| row.clone()).collect();
        Ok(Self::sorted(rows))
    }

    async fn find_by_old_url(&self, old_url: &str) -> Result<Vec<RedirectRecord>> {
        let rows = self
            .redirects
            .iter()
            .filter(|row| row.old_url == old_url)
            .map(|row| row.clone())
            .collect();
        Ok(Self::sorted(rows))
    }
}
