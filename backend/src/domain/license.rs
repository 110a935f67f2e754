//! Allow-list of licenses a thing may be published under.
//!
//! The registry is a static name → canonical URL mapping. Extending it is a
//! configuration change made when the registry is constructed; there is no
//! runtime mutation.

use std::collections::BTreeMap;

use super::Rejection;

/// Licenses accepted out of the box.
pub const BUILTIN_LICENSES: &[(&str, &str)] = &[
    ("MIT", "http://opensource.org/licenses/MIT"),
    ("Apache-2.0", "http://opensource.org/licenses/Apache-2.0"),
    ("BSD-2-Clause", "http://opensource.org/licenses/BSD-2-Clause"),
    ("BSD-3-Clause", "http://opensource.org/licenses/BSD-3-Clause"),
    ("GPL-2.0", "http://opensource.org/licenses/GPL-2.0"),
    ("GPL-3.0", "http://opensource.org/licenses/GPL-3.0"),
    ("LGPL-2.1", "http://opensource.org/licenses/LGPL-2.1"),
    ("LGPL-3.0", "http://opensource.org/licenses/LGPL-3.0"),
    ("AGPL-3.0", "http://opensource.org/licenses/AGPL-3.0"),
    ("CC-BY-3.0", "http://creativecommons.org/licenses/by/3.0/"),
    ("CC-BY-SA-3.0", "http://creativecommons.org/licenses/by-sa/3.0/"),
    ("CC-BY-4.0", "http://creativecommons.org/licenses/by/4.0/"),
    ("CC-BY-SA-4.0", "http://creativecommons.org/licenses/by-sa/4.0/"),
    ("CC0-1.0", "http://creativecommons.org/publicdomain/zero/1.0/"),
];

/// Name → canonical URL lookup table.
///
/// # Examples
/// ```
/// use cadinet::domain::LicenseRegistry;
///
/// let registry = LicenseRegistry::default();
/// assert_eq!(registry.url_for("MIT"), Some("http://opensource.org/licenses/MIT"));
/// assert!(registry.check("MIT", "http://opensource.org/licenses/MIT").is_ok());
/// assert!(registry.check("MIT", "https://opensource.org/licenses/MIT").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRegistry {
    entries: BTreeMap<String, String>,
}

impl Default for LicenseRegistry {
    fn default() -> Self {
        Self::from_entries(BUILTIN_LICENSES.iter().copied())
    }
}

impl LicenseRegistry {
    /// Build a registry from explicit `(name, url)` pairs.
    pub fn from_entries<N, U>(entries: impl IntoIterator<Item = (N, U)>) -> Self
    where
        N: Into<String>,
        U: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
        }
    }

    /// Canonical URL registered for `name`.
    pub fn url_for(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Registered license names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Require `name` to be registered and `url` to match its canonical URL exactly.
    pub fn check(&self, name: &str, url: &str) -> Result<(), Rejection> {
        let Some(canonical) = self.url_for(name) else {
            return Err(Rejection::invalid(
                "/license",
                "unknown_license",
                format!("license {name} is not accepted"),
            ));
        };
        if canonical != url {
            return Err(Rejection::invalid(
                "/license_url",
                "license_url_mismatch",
                format!("license_url does not match the registered URL for {name}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn violation_code(result: Result<(), Rejection>) -> &'static str {
        match result {
            Err(Rejection::PayloadInvalid(violation)) => violation.code,
            other => panic!("expected payload rejection, got {other:?}"),
        }
    }

    #[rstest]
    fn accepts_exact_canonical_url() {
        let registry = LicenseRegistry::default();
        assert!(registry.check("MIT", "http://opensource.org/licenses/MIT").is_ok());
    }

    #[rstest]
    #[case("http://opensource.org/licenses/mit")]
    #[case("http://opensource.org/licenses/MIT/")]
    #[case("http://opensource.org/licenses/Apache-2.0")]
    #[case("")]
    fn rejects_mismatched_url(#[case] url: &str) {
        let registry = LicenseRegistry::default();
        assert_eq!(violation_code(registry.check("MIT", url)), "license_url_mismatch");
    }

    #[rstest]
    #[case("mit")]
    #[case("WTFPL")]
    fn rejects_unknown_names(#[case] name: &str) {
        let registry = LicenseRegistry::default();
        assert_eq!(
            violation_code(registry.check(name, "http://opensource.org/licenses/MIT")),
            "unknown_license"
        );
    }

    #[rstest]
    fn custom_entries_replace_builtins() {
        let registry = LicenseRegistry::from_entries([("Custom", "https://example.org/l")]);
        assert!(registry.check("Custom", "https://example.org/l").is_ok());
        assert!(registry.url_for("MIT").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Custom"]);
    }
}
