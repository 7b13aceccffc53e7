use crate::error::Result;
use async_trait::async_trait;
use autoredirect_core::{
    strip_admin_prefix, substitute_alias, ArticleRepository, Clock, ContentPlugin,
    ContentSaveEvent, NewRedirect, PluginError, RedirectField, RedirectRepository, RouteContext,
    Router, SaveDecision, SystemClock, ARTICLE_CONTEXT, DEFAULT_ADMIN_PREFIX,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// The redirect recorded for one alias change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasChange {
    pub old_url: String,
    pub new_url: String,
}

/// Records a permanent redirect whenever an article's alias changes.
///
/// The maintainer is stateless between calls; the redirect table is the only
/// persisted state. Its four writes are independent statements, so two
/// concurrent alias changes of the same article may interleave.
#[derive(TypedBuilder)]
pub struct RedirectMaintainer<A, R, Rt> {
    articles: Arc<A>,
    redirects: Arc<R>,
    router: Arc<Rt>,
    #[builder(default = Arc::new(SystemClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
    /// Segment removed from routed paths before they are stored.
    #[builder(default = DEFAULT_ADMIN_PREFIX.to_string(), setter(into))]
    admin_prefix: String,
    /// Context tag of the saves this maintainer reacts to.
    #[builder(default = ARTICLE_CONTEXT.to_string(), setter(into))]
    context: String,
}

impl<A, R, Rt> RedirectMaintainer<A, R, Rt>
where
    A: ArticleRepository,
    R: RedirectRepository,
    Rt: Router,
{
    /// Reacts to a pre-save notification.
    ///
    /// Returns the recorded redirect, or `None` when the save is not an update
    /// of an existing article in the configured context or the alias did not
    /// change.
    pub async fn handle(&self, event: &ContentSaveEvent) -> Result<Option<AliasChange>> {
        if event.context != self.context || event.is_new {
            trace!(context = %event.context, is_new = event.is_new, "ignoring save");
            return Ok(None);
        }

        let article_id = event.data.id;
        let Some(original) = self.articles.find_article(article_id).await? else {
            warn!(article_id, "no stored article for save, skipping redirect");
            return Ok(None);
        };

        if event.data.alias == original.alias {
            trace!(article_id, alias = %original.alias, "alias unchanged");
            return Ok(None);
        }

        let routed = self
            .router
            .build_article_route(&original.route(), RouteContext::Site)
            .await?;
        let old_url = strip_admin_prefix(&routed, &self.admin_prefix);
        let new_url = substitute_alias(&old_url, &original.alias, &event.data.alias);

        self.delete_redirect(&old_url).await?;
        self.update_redirect(&old_url, RedirectField::NewUrl, &new_url)
            .await?;
        self.create_redirect(&old_url, &new_url).await?;
        self.clean_useless_redirects().await?;

        info!(article_id, old_url = %old_url, new_url = %new_url, "recorded alias redirect");
        Ok(Some(AliasChange { old_url, new_url }))
    }

    /// Removes stale rows that already redirect away from `old_url`.
    pub async fn delete_redirect(&self, old_url: &str) -> Result<u64> {
        let rows = self.redirects.delete_by_old_url(old_url).await?;
        debug!(old_url, rows, "deleted redirects");
        Ok(rows)
    }

    /// Rewrites `field` from `current` to `replacement` on every matching row.
    ///
    /// Called with [`RedirectField::NewUrl`], this points earlier redirects at
    /// the final destination instead of an intermediate one.
    pub async fn update_redirect(
        &self,
        current: &str,
        field: RedirectField,
        replacement: &str,
    ) -> Result<u64> {
        let rows = self
            .redirects
            .update_redirects(field, current, replacement, self.clock.now())
            .await?;
        debug!(%field, current, replacement, rows, "updated redirects");
        Ok(rows)
    }

    /// Inserts a published 301 redirect.
    pub async fn create_redirect(&self, old_url: &str, new_url: &str) -> Result<()> {
        self.redirects
            .insert(NewRedirect::permanent(old_url, new_url, self.clock.now()))
            .await?;
        debug!(old_url, new_url, "created redirect");
        Ok(())
    }

    /// Deletes every row that redirects a path to itself.
    pub async fn clean_useless_redirects(&self) -> Result<u64> {
        let rows = self.redirects.delete_self_redirects().await?;
        debug!(rows, "pruned self redirects");
        Ok(rows)
    }
}

#[async_trait]
impl<A, R, Rt> ContentPlugin for RedirectMaintainer<A, R, Rt>
where
    A: ArticleRepository,
    R: RedirectRepository,
    Rt: Router,
{
    async fn on_content_before_save(
        &self,
        event: &ContentSaveEvent,
    ) -> std::result::Result<SaveDecision, PluginError> {
        self.handle(event).await?;
        Ok(SaveDecision::Proceed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaintainerError;
    use autoredirect_core::error::Result as StorageResult;
    use autoredirect_core::{
        ArticleRoute, ArticleSnapshot, IncomingArticle, RedirectRecord, RoutingError,
        StorageError,
    };
    use autoredirect_storage::InMemoryRepository;
    use jiff::Timestamp;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Router that always answers with the same path, as built from the
    /// administrator console.
    struct AdminRouter {
        path: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Router for AdminRouter {
        async fn build_article_route(
            &self,
            _route: &ArticleRoute,
            _context: RouteContext,
        ) -> std::result::Result<String, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.path.clone())
        }
    }

    struct TestClock {
        now: Mutex<Timestamp>,
    }

    impl Clock for TestClock {
        fn now(&self) -> Timestamp {
            *self
                .now
                .lock()
                .expect("test clock lock should not be poisoned")
        }
    }

    /// Redirect store whose inserts always fail.
    struct BrokenInserts {
        inner: InMemoryRepository,
    }

    #[async_trait]
    impl RedirectRepository for BrokenInserts {
        async fn delete_by_old_url(&self, old_url: &str) -> StorageResult<u64> {
            self.inner.delete_by_old_url(old_url).await
        }

        async fn update_redirects(
            &self,
            field: RedirectField,
            current: &str,
            replacement: &str,
            now: Timestamp,
        ) -> StorageResult<u64> {
            self.inner
                .update_redirects(field, current, replacement, now)
                .await
        }

        async fn insert(&self, _redirect: NewRedirect) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection lost".to_string()))
        }

        async fn delete_self_redirects(&self) -> StorageResult<u64> {
            self.inner.delete_self_redirects().await
        }

        async fn list(&self) -> StorageResult<Vec<RedirectRecord>> {
            self.inner.list().await
        }

        async fn find_by_old_url(&self, old_url: &str) -> StorageResult<Vec<RedirectRecord>> {
            self.inner.find_by_old_url(old_url).await
        }
    }

    fn fixed_now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn repo_with_article() -> Arc<InMemoryRepository> {
        let repo = InMemoryRepository::new();
        repo.insert_article(ArticleSnapshot {
            id: 5,
            alias: "old-slug".to_string(),
            catid: 2,
            language: "*".to_string(),
        });
        Arc::new(repo)
    }

    fn admin_router() -> Arc<AdminRouter> {
        Arc::new(AdminRouter {
            path: "/administrator/index.php/old-slug".to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn maintainer(
        repo: Arc<InMemoryRepository>,
        router: Arc<AdminRouter>,
    ) -> RedirectMaintainer<InMemoryRepository, InMemoryRepository, AdminRouter> {
        RedirectMaintainer::builder()
            .articles(repo.clone())
            .redirects(repo)
            .router(router)
            .clock(Arc::new(TestClock {
                now: Mutex::new(fixed_now()),
            }))
            .build()
    }

    #[tokio::test]
    async fn strips_admin_prefix_from_routed_path() {
        let repo = repo_with_article();
        let router = admin_router();
        let service = maintainer(repo.clone(), router.clone());

        let change = service
            .handle(&ContentSaveEvent::article_update(5, "new-slug"))
            .await
            .unwrap()
            .expect("alias changed");

        assert_eq!(change.old_url, "/index.php/old-slug");
        assert_eq!(change.new_url, "/index.php/new-slug");
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);

        let rows = repo.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, fixed_now());
        assert_eq!(rows[0].modified_at, fixed_now());
    }

    #[tokio::test]
    async fn other_contexts_are_ignored() {
        let repo = repo_with_article();
        let router = admin_router();
        let service = maintainer(repo.clone(), router.clone());
        let event = ContentSaveEvent::new(
            "com_content.category",
            false,
            IncomingArticle::new(5, "new-slug"),
        );

        assert!(service.handle(&event).await.unwrap().is_none());
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_article_is_skipped() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = maintainer(repo.clone(), admin_router());

        let change = service
            .handle(&ContentSaveEvent::article_update(42, "new-slug"))
            .await
            .unwrap();

        assert!(change.is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_context_is_honoured() {
        let repo = repo_with_article();
        let service = RedirectMaintainer::builder()
            .articles(repo.clone())
            .redirects(repo.clone())
            .router(admin_router())
            .context("com_blog.post")
            .build();

        let ignored = ContentSaveEvent::article_update(5, "new-slug");
        assert!(service.handle(&ignored).await.unwrap().is_none());

        let handled =
            ContentSaveEvent::new("com_blog.post", false, IncomingArticle::new(5, "new-slug"));
        assert!(service.handle(&handled).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn storage_failure_propagates_and_stops_later_steps() {
        let repo = repo_with_article();
        let redirects = Arc::new(BrokenInserts {
            inner: InMemoryRepository::new(),
        });
        redirects
            .inner
            .insert(NewRedirect::permanent("/index.php/a", "/index.php/old-slug", fixed_now()))
            .await
            .unwrap();
        redirects
            .inner
            .insert(NewRedirect::permanent("/index.php/loop", "/index.php/loop", fixed_now()))
            .await
            .unwrap();

        let service = RedirectMaintainer::builder()
            .articles(repo)
            .redirects(redirects.clone())
            .router(admin_router())
            .build();

        let err = service
            .handle(&ContentSaveEvent::article_update(5, "new-slug"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaintainerError::Storage(StorageError::Unavailable(_))
        ));

        // The chain update ran before the failure and is kept; pruning never ran.
        let rows = redirects.list().await.unwrap();
        assert_eq!(rows[0].new_url, "/index.php/new-slug");
        assert!(rows.iter().any(|row| row.is_self_redirect()));
    }

    #[tokio::test]
    async fn plugin_always_proceeds_on_success() {
        let repo = repo_with_article();
        let service = maintainer(repo, admin_router());

        let decision = service
            .on_content_before_save(&ContentSaveEvent::article_update(5, "new-slug"))
            .await
            .unwrap();
        assert_eq!(decision, SaveDecision::Proceed);

        let decision = service
            .on_content_before_save(&ContentSaveEvent::article_update(5, "old-slug"))
            .await
            .unwrap();
        assert_eq!(decision, SaveDecision::Proceed);
    }

    #[tokio::test]
    async fn plugin_surfaces_routing_errors() {
        struct FailingRouter;

        #[async_trait]
        impl Router for FailingRouter {
            async fn build_article_route(
                &self,
                route: &ArticleRoute,
                _context: RouteContext,
            ) -> std::result::Result<String, RoutingError> {
                Err(RoutingError::ArticleNotFound(route.id))
            }
        }

        let repo = repo_with_article();
        let service = RedirectMaintainer::builder()
            .articles(repo.clone())
            .redirects(repo.clone())
            .router(Arc::new(FailingRouter))
            .build();

        let err = service
            .on_content_before_save(&ContentSaveEvent::article_update(5, "new-slug"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("article not found"));
        assert!(repo.list().await.unwrap().is_empty());
    }
}
