use async_trait::async_trait;
use autoredirect_core::{
    ArticleRepository, ArticleRoute, RouteContext, Router, RoutingError, DEFAULT_ADMIN_PREFIX,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;
use typed_builder::TypedBuilder;

/// Language tag meaning "all languages"; it never adds a path segment.
const ALL_LANGUAGES: &str = "*";

#[derive(Debug, Clone, TypedBuilder)]
pub struct SefRouterConfig {
    /// Entry script or base path every route starts with.
    #[builder(default = "/index.php".to_string(), setter(into))]
    pub base: String,
    /// Prepended to paths built in [`RouteContext::Administrator`].
    #[builder(default = DEFAULT_ADMIN_PREFIX.to_string(), setter(into))]
    pub admin_prefix: String,
    /// Language tag to URL segment, e.g. `en-GB -> en`.
    #[builder(default)]
    pub language_segments: HashMap<String, String>,
    /// Category id to category path, e.g. `2 -> news/local`.
    #[builder(default)]
    pub category_paths: HashMap<u64, String>,
}

impl Default for SefRouterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builds `{admin}{base}{/lang}{/category}/{alias}` paths, falling back to the
/// article id when the stored alias is empty.
///
/// The alias is looked up from the article store, so the path always reflects
/// what is currently persisted for the article.
#[derive(Debug, Clone)]
pub struct SefRouter<A> {
    articles: Arc<A>,
    config: SefRouterConfig,
}

impl<A: ArticleRepository> SefRouter<A> {
    pub fn new(articles: Arc<A>, config: SefRouterConfig) -> Self {
        Self { articles, config }
    }

    pub fn config(&self) -> &SefRouterConfig {
        &self.config
    }

    fn push_segment(path: &mut String, segment: &str) {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            return;
        }
        path.push('/');
        path.push_str(segment);
    }
}

#[async_trait]
impl<A: ArticleRepository> Router for SefRouter<A> {
    async fn build_article_route(
        &self,
        route: &ArticleRoute,
        context: RouteContext,
    ) -> Result<String, RoutingError> {
        let article = self
            .articles
            .find_article(route.id)
            .await?
            .ok_or(RoutingError::ArticleNotFound(route.id))?;

        let mut path = String::new();
        if context == RouteContext::Administrator {
            path.push_str(self.config.admin_prefix.trim_end_matches('/'));
        }
        path.push_str(self.config.base.trim_end_matches('/'));

        if route.language != ALL_LANGUAGES {
            if let Some(segment) = self.config.language_segments.get(&route.language) {
                Self::push_segment(&mut path, segment);
            }
        }
        if let Some(category) = self.config.category_paths.get(&route.catid) {
            Self::push_segment(&mut path, category);
        }
        // Articles saved without an alias are reachable by id.
        if article.alias.trim().is_empty() {
            Self::push_segment(&mut path, &route.id.to_string());
        } else {
            Self::push_segment(&mut path, &article.alias);
        }

        trace!(article_id = route.id, %context, path = %path, "built article route");
        Ok(path)
    }
}
