use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::types::errors::LocaleError;

/// Catalogs compiled into the crate.
const BUILTIN_CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("de", include_str!("../../locales/de.json")),
    ("ru", include_str!("../../locales/ru.json")),
];

/// Default locale when the requested one is not available.
pub const DEFAULT_LOCALE: &str = "en";

/// Key of the title given to bookmarks stored without one.
pub const UNTITLED_KEY: &str = "bookmark.untitled";

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// Localization engine for store-side default strings.
pub struct LocalizationEngine {
    /// Current active locale (e.g., "en" or "de").
    current_locale: String,
    /// Loaded locale data: maps locale name to its parsed JSON value.
    locales: HashMap<String, Value>,
}

impl LocalizationEngine {
    /// Creates an engine with the built-in catalogs and the default locale.
    pub fn new() -> Result<Self, LocaleError> {
        let mut locales = HashMap::new();
        for (name, raw) in BUILTIN_CATALOGS {
            let data: Value = serde_json::from_str(raw)
                .map_err(|e| LocaleError::MalformedCatalog(format!("{}: {}", name, e)))?;
            locales.insert(name.to_string(), data);
        }
        Ok(Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales,
        })
    }

    /// Creates an engine and switches to `lang`, falling back to the default
    /// locale when `lang` has no catalog.
    pub fn for_locale(lang: &str) -> Result<Self, LocaleError> {
        let mut engine = Self::new()?;
        if engine.set_locale(lang).is_err() {
            tracing::warn!("Locale '{}' not available, using '{}'", lang, DEFAULT_LOCALE);
        }
        Ok(engine)
    }

    /// Adds or replaces catalogs from `<dir>/<locale>.json` files.
    ///
    /// Returns the number of catalogs loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, LocaleError> {
        let entries = fs::read_dir(dir)
            .map_err(|e| LocaleError::MalformedCatalog(format!("{}: {}", dir.display(), e)))?;
        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .map_err(|e| LocaleError::MalformedCatalog(format!("{}: {}", path.display(), e)))?;
            let data: Value = serde_json::from_str(&content).map_err(|e| {
                LocaleError::MalformedCatalog(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            self.locales.insert(name.to_string(), data);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// The localized title for bookmarks stored without one.
    pub fn untitled(&self) -> String {
        self.t(UNTITLED_KEY, None)
    }

    /// Looks up a nested key in a JSON value using dot notation.
    /// For example, "bookmark.untitled" looks up `value["bookmark"]["untitled"]`.
    fn lookup_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
        key.split('.').try_fold(data, |current, part| current.get(part))
    }

    /// Replaces `{param_name}` placeholders in a string with values from the params map.
    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    /// Switches the active locale. Returns an error if no catalog is loaded for it.
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        self.current_locale = lang.to_string();
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Looks up a translation key using dot notation and optionally interpolates parameters.
    /// Falls back to the default locale, then to the key itself.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        let text = [self.current_locale.as_str(), DEFAULT_LOCALE]
            .iter()
            .filter_map(|locale| self.locales.get(*locale))
            .find_map(|data| Self::lookup_key(data, key).and_then(Value::as_str));

        match (text, params) {
            (Some(t), Some(p)) => Self::interpolate(t, p),
            (Some(t), None) => t.to_string(),
            (None, _) => key.to_string(),
        }
    }

    /// Returns a sorted list of all loaded locales.
    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}
