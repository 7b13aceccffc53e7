use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The persisted state of an article immediately before a save overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    /// Primary key of the article.
    pub id: u64,
    /// URL slug of the article.
    pub alias: String,
    /// Category the article belongs to.
    pub catid: u64,
    /// Language tag, `*` for all languages.
    pub language: String,
}

impl ArticleSnapshot {
    /// Returns the routing inputs for this article.
    pub fn route(&self) -> ArticleRoute {
        ArticleRoute {
            id: self.id,
            catid: self.catid,
            language: self.language.clone(),
        }
    }
}

/// Inputs the router needs to build the public path of an article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRoute {
    pub id: u64,
    pub catid: u64,
    pub language: String,
}

#[async_trait]
pub trait ArticleRepository: Send + Sync + 'static {
    /// Loads the stored version of an article.
    /// Returns `None` if no article has the given id.
    async fn find_article(&self, id: u64) -> Result<Option<ArticleSnapshot>>;

    /// Overwrites the alias of a stored article.
    /// Returns `true` if the article existed.
    async fn update_alias(&self, id: u64, alias: &str) -> Result<bool>;
}
