//! Paths the gate never sees: API calls, framework assets, images.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedPaths {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl ExcludedPaths {
    /// Nothing excluded; every request is evaluated.
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
            suffixes: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into());
        self
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }
}

impl Default for ExcludedPaths {
    fn default() -> Self {
        let mut excluded = Self::none();
        for prefix in ["/api", "/_next/static", "/_next/image", "/favicon.ico"] {
            excluded = excluded.with_prefix(prefix);
        }
        for suffix in [".png", ".jpg", ".jpeg", ".gif", ".svg"] {
            excluded = excluded.with_suffix(suffix);
        }
        excluded
    }
}
