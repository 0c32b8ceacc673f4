//! Help URL tables
//!
//! A help URL table maps locales to documentation links. The owning module may ship
//! its own table in the manifest (`help_url`); otherwise the built-in one is used.

use std::collections::BTreeMap;

use serde_json::Value;

/// Key holding the fallback entry of a table
pub const DEFAULT_KEY: &str = "default";

const DEFAULT_HELP_URL: &str = "https://addons.prestashop.com/en/contact-us";

const BUILTIN_HELP_URLS: &[(&str, &str)] = &[
    ("de", "https://addons.prestashop.com/de/contact-us"),
    ("en", "https://addons.prestashop.com/en/contact-us"),
    ("es", "https://addons.prestashop.com/es/contact-us"),
    ("fr", "https://addons.prestashop.com/fr/contact-us"),
    ("it", "https://addons.prestashop.com/it/contact-us"),
    ("nl", "https://addons.prestashop.com/nl/contact-us"),
    ("pl", "https://addons.prestashop.com/pl/contact-us"),
    ("pt", "https://addons.prestashop.com/pt/contact-us"),
];

/// Locale to URL table with a default entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpUrls {
    entries: BTreeMap<String, String>,
    default: String,
}

impl Default for HelpUrls {
    fn default() -> Self {
        Self {
            entries: BUILTIN_HELP_URLS
                .iter()
                .map(|(locale, url)| ((*locale).to_string(), (*url).to_string()))
                .collect(),
            default: DEFAULT_HELP_URL.to_string(),
        }
    }
}

impl HelpUrls {
    /// Build a table from a manifest `help_url` document.
    ///
    /// Returns `None` when the document is not an object of strings; callers then fall
    /// back to `fallback`'s default entry. Keys are normalized like locales.
    pub fn from_document(document: &Value, fallback: &HelpUrls) -> Option<Self> {
        let object = document.as_object()?;
        let mut entries = BTreeMap::new();
        for (key, value) in object {
            entries.insert(normalize_locale(key), value.as_str()?.to_string());
        }

        let default = entries
            .remove(DEFAULT_KEY)
            .unwrap_or_else(|| fallback.default.clone());

        Some(Self { entries, default })
    }

    /// Resolve the URL for a locale.
    ///
    /// Tries the full normalized locale (`fr-ca`), then its language (`fr`), then the
    /// `default_locale` entry, then the table default.
    pub fn resolve(&self, locale: &str, default_locale: &str) -> &str {
        let normalized = normalize_locale(locale);
        let language = normalized.split('-').next().unwrap_or_default();
        let fallback = normalize_locale(default_locale);

        [normalized.as_str(), language, fallback.as_str()]
            .into_iter()
            .find_map(|key| self.entries.get(key))
            .map_or(self.default.as_str(), String::as_str)
    }

    /// The entry used when nothing else matches
    pub fn default_url(&self) -> &str {
        &self.default
    }
}

/// Normalize locale separators and case (`fr_FR`, `FR-fr` → `fr-fr`)
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}
