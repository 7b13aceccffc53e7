use crate::article::ArticleRoute;
use crate::error::RoutingError;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};

/// The application a route is built for.
///
/// Routers shared between the public site and the administrator console may
/// prefix paths built in the administrator context with an admin segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteContext {
    #[default]
    Site,
    Administrator,
}

impl Display for RouteContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteContext::Site => write!(f, "site"),
            RouteContext::Administrator => write!(f, "administrator"),
        }
    }
}

#[async_trait]
pub trait Router: Send + Sync + 'static {
    /// Builds the canonical public path of an article.
    async fn build_article_route(
        &self,
        route: &ArticleRoute,
        context: RouteContext,
    ) -> Result<String, RoutingError>;
}
