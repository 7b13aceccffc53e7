use clap::{Parser, Subcommand};

pub const MYSQL_DSN_ENV: &str = "AUTOREDIRECT_MYSQL_DSN";
pub const ROUTER_BASE_ENV: &str = "AUTOREDIRECT_ROUTER_BASE";
pub const ADMIN_PREFIX_ENV: &str = "AUTOREDIRECT_ADMIN_PREFIX";

pub const DEFAULT_ROUTER_BASE: &str = "/index.php";
pub const DEFAULT_ADMIN_PREFIX: &str = "/administrator";

#[derive(Debug, Parser)]
#[command(name = "autoredirect", about = "Maintain redirects for renamed articles")]
pub struct CLI {
    #[arg(long, env = MYSQL_DSN_ENV)]
    pub mysql_dsn: String,

    #[arg(long, env = ROUTER_BASE_ENV, default_value = DEFAULT_ROUTER_BASE)]
    pub base: String,

    #[arg(long, env = ADMIN_PREFIX_ENV, default_value = DEFAULT_ADMIN_PREFIX)]
    pub admin_prefix: String,

    /// Language tag to path segment, e.g. `en-GB=en`. Repeatable.
    #[arg(long = "language-segment", value_parser = parse_key_value::<String>)]
    pub language_segments: Vec<(String, String)>,

    /// Category id to category path, e.g. `2=news/local`. Repeatable.
    #[arg(long = "category-path", value_parser = parse_key_value::<u64>)]
    pub category_paths: Vec<(u64, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the content and redirect tables if they do not exist.
    InitSchema,
    /// Change an article's alias and record the redirect for it.
    Rename {
        #[arg(long)]
        article_id: u64,
        #[arg(long)]
        alias: String,
    },
    /// Delete redirects that point a path at itself.
    Prune,
    /// Print every stored redirect.
    List,
}

fn parse_key_value<K>(raw: &str) -> Result<(K, String), String>
where
    K: std::str::FromStr,
    K::Err: std::fmt::Display,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key
        .trim()
        .parse()
        .map_err(|e| format!("invalid key '{key}': {e}"))?;
    Ok((key, value.trim().to_string()))
}
