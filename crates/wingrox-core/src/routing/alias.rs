//! Endpoint alias sets: the ordered, logically-equivalent paths of one operation.

use serde::Serialize;

/// Normalize a route path: leading `/`, duplicate slashes collapsed, no
/// trailing `/` (except for the root itself). Anything after `?` is dropped.
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Ordered, de-duplicated list of normalized paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasSet {
    paths: Vec<String>,
}

impl AliasSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for path in paths {
            let path = normalize_path(path.as_ref());
            if !normalized.contains(&path) {
                normalized.push(path);
            }
        }
        Self { paths: normalized }
    }

    /// `prefix + path` for every prefix, in prefix order.
    pub fn from_prefixes<P: AsRef<str>>(prefixes: &[P], path: &str) -> Self {
        Self::new(prefixes.iter().map(|prefix| format!("{}/{}", prefix.as_ref(), path)))
    }

    /// Same aliases with `suffix` appended to each (e.g. `/:id/like`).
    pub fn join(&self, suffix: &str) -> Self {
        Self::new(self.paths.iter().map(|path| format!("{}/{}", path, suffix)))
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn primary(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("api//community/posts/"), "/api/community/posts");
        assert_eq!(normalize_path("/products?limit=2"), "/products");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("///"), "/");
    }

    #[test]
    fn test_from_prefixes_keeps_prefix_order() {
        let set = AliasSet::from_prefixes(&["/api", "", "/emergency"], "/community/posts");
        assert_eq!(
            set.paths(),
            &["/api/community/posts", "/community/posts", "/emergency/community/posts"]
        );
        assert_eq!(set.primary(), Some("/api/community/posts"));
    }

    #[test]
    fn test_duplicates_removed_after_normalization() {
        let set = AliasSet::from_prefixes(&["", "/", "/api/", "/api"], "products");
        assert_eq!(set.paths(), &["/products", "/api/products"]);
    }

    #[test]
    fn test_join_appends_suffix() {
        let set = AliasSet::new(["/api/products", "/products"]).join(":id/like");
        assert_eq!(set.paths(), &["/api/products/:id/like", "/products/:id/like"]);
    }
}
