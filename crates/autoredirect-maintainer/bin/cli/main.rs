mod cli;

use crate::cli::{Command, CLI};
use autoredirect_core::{ContentSaveEvent, RedirectRepository};
use autoredirect_maintainer::RedirectMaintainer;
use autoredirect_router::{SefRouter, SefRouterConfig};
use autoredirect_storage::{ArticleRepository, MySqlRepository};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CLI::try_parse()?;
    let repository = Arc::new(MySqlRepository::connect(&config.mysql_dsn).await?);

    match config.command {
        Command::InitSchema => {
            repository.ensure_schema().await?;
            info!("schema ready");
        }
        Command::Rename {
            article_id,
            ref alias,
        } => {
            let router_config = SefRouterConfig::builder()
                .base(config.base.clone())
                .admin_prefix(config.admin_prefix.clone())
                .language_segments(config.language_segments.iter().cloned().collect())
                .category_paths(config.category_paths.iter().cloned().collect())
                .build();
            let router = Arc::new(SefRouter::new(repository.clone(), router_config));
            let maintainer = RedirectMaintainer::builder()
                .articles(repository.clone())
                .redirects(repository.clone())
                .router(router)
                .admin_prefix(config.admin_prefix.clone())
                .build();

            let event = ContentSaveEvent::article_update(article_id, alias.clone());
            let change = maintainer.handle(&event).await?;
            if !repository.update_alias(article_id, alias).await? {
                return Err(format!("article {article_id} not found").into());
            }

            match change {
                Some(change) => println!("{} -> {}", change.old_url, change.new_url),
                None => println!("alias unchanged, no redirect recorded"),
            }
        }
        Command::Prune => {
            let rows = repository.delete_self_redirects().await?;
            println!("pruned {rows} self redirects");
        }
        Command::List => {
            for row in repository.list().await? {
                let state = if row.published { "" } else { " unpublished" };
                println!(
                    "{} -> {} ({}{state})",
                    row.old_url, row.new_url, row.status_code
                );
            }
        }
    }

    Ok(())
}
