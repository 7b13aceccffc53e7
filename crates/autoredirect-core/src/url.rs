//! String helpers for turning routed paths into redirect URLs.

/// Path segment administrator-context routers put in front of site paths.
pub const DEFAULT_ADMIN_PREFIX: &str = "/administrator";

/// Removes every occurrence of `prefix` from `url`.
///
/// An empty prefix leaves the URL untouched.
pub fn strip_admin_prefix(url: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return url.to_string();
    }
    url.replace(prefix, "")
}

/// Replaces every occurrence of `old_alias` in `url` with `new_alias`.
///
/// This is a literal substitution, not a re-route: if the old alias also
/// appears in another segment (e.g. a category path), that segment is
/// rewritten as well.
pub fn substitute_alias(url: &str, old_alias: &str, new_alias: &str) -> String {
    if old_alias.is_empty() {
        return url.to_string();
    }
    url.replace(old_alias, new_alias)
}
