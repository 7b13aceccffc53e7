//! Core types and traits for automatic alias redirects.
//!
//! This crate provides the shared domain types and the ports (repositories,
//! router, clock) used by the redirect maintainer and its storage backends.

pub mod article;
pub mod clock;
pub mod error;
pub mod event;
pub mod plugin;
pub mod redirect;
pub mod router;
pub mod url;

pub use article::{ArticleRepository, ArticleRoute, ArticleSnapshot};
pub use clock::{Clock, SystemClock};
pub use error::{EventError, RoutingError, StorageError};
pub use event::{ContentSaveEvent, IncomingArticle, ARTICLE_CONTEXT};
pub use plugin::{ContentPlugin, PluginError, SaveDecision};
pub use redirect::{
    NewRedirect, RedirectField, RedirectRecord, RedirectRepository, PERMANENT_REDIRECT,
};
pub use router::{RouteContext, Router};
pub use url::{strip_admin_prefix, substitute_alias, DEFAULT_ADMIN_PREFIX};
