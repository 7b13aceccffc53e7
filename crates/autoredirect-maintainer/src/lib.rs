//! Keeps redirects in sync with article aliases.
//!
//! [`RedirectMaintainer`] listens for "content about to be saved"
//! notifications. When an article's alias changes it records a permanent
//! redirect from the old public path to the new one, collapses redirect
//! chains that pointed at the old path, and prunes self-redirects.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use autoredirect_core::{ArticleSnapshot, ContentSaveEvent, RedirectRepository};
//! use autoredirect_maintainer::RedirectMaintainer;
//! use autoredirect_router::{SefRouter, SefRouterConfig};
//! use autoredirect_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Arc::new(InMemoryRepository::new());
//! repo.insert_article(ArticleSnapshot {
//!     id: 5,
//!     alias: "old-slug".to_string(),
//!     catid: 2,
//!     language: "*".to_string(),
//! });
//!
//! let router = Arc::new(SefRouter::new(repo.clone(), SefRouterConfig::default()));
//! let maintainer = RedirectMaintainer::builder()
//!     .articles(repo.clone())
//!     .redirects(repo.clone())
//!     .router(router)
//!     .build();
//!
//! maintainer
//!     .handle(&ContentSaveEvent::article_update(5, "new-slug"))
//!     .await?;
//!
//! let rows = repo.list().await?;
//! assert_eq!(rows[0].old_url, "/index.php/old-slug");
//! assert_eq!(rows[0].new_url, "/index.php/new-slug");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod maintainer;

pub use error::{MaintainerError, Result};
pub use maintainer::{AliasChange, RedirectMaintainer};
