use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Bundled Fluent resources, one per supported locale
const LOCALE_RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

const DEFAULT_LANGUAGE: &str = "en";

/// Localization manager for the publicity bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl std::fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationManager")
            .field("languages", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LocalizationManager {
    /// Create a new localization manager
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (locale_str, source) in LOCALE_RESOURCES {
            let locale: LanguageIdentifier = locale_str.parse()?;
            let bundle = Self::create_bundle(locale, source)?;
            bundles.insert(locale_str.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Messages are sent as plain text; no Unicode isolation marks around placeables
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid Fluent resource: {:?}", errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate Fluent messages: {:?}", errors))?;

        Ok(bundle)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&FluentArgs>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {}", key),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, args, &mut errors)
            .into_owned()
    }

    /// Localized message in the user's language
    pub fn t(&self, key: &str, language_code: Option<&str>) -> String {
        let language = self.detect_language(language_code);
        self.get_message_in_language(key, &language, None)
    }

    /// Localized message with arguments in the user's language
    pub fn t_args(&self, key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
        let language = self.detect_language(language_code);
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(value.to_string()));
        }
        self.get_message_in_language(key, &language, Some(&fluent_args))
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Detect the appropriate language based on user's Telegram language code
    pub fn detect_language(&self, language_code: Option<&str>) -> String {
        if let Some(code) = language_code {
            // "fr-FR" -> "fr"
            let lang = code.split('-').next().unwrap_or(DEFAULT_LANGUAGE);
            if self.is_language_supported(lang) {
                return lang.to_string();
            }
        }

        DEFAULT_LANGUAGE.to_string()
    }
}

/// Create a shared localization manager
pub fn create_localization_manager() -> Result<Arc<LocalizationManager>> {
    Ok(Arc::new(LocalizationManager::new()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.detect_language(Some("fr-FR")), "fr");
        assert_eq!(manager.detect_language(Some("en")), "en");
        assert_eq!(manager.detect_language(Some("de")), "en");
        assert_eq!(manager.detect_language(None), "en");
    }

    #[test]
    fn test_plain_message() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(
            manager.t("publicise-prompt", None),
            "Please send a publicity picture (optional) or type 'na' if no picture is required."
        );
    }

    #[test]
    fn test_message_with_arguments_has_no_isolation_marks() {
        let manager = LocalizationManager::new().unwrap();
        let text = manager.t_args("rejection-notice", &[("reason", "Too long")], Some("en"));
        assert_eq!(text, "Your message was rejected. Reason:\n\nToo long");
    }

    #[test]
    fn test_every_english_key_exists_in_french() {
        let manager = LocalizationManager::new().unwrap();
        for key in [
            "start-greeting",
            "help-private",
            "publicise-prompt",
            "review-action-rejected",
            "feedback-sent",
        ] {
            assert!(!manager.t(key, Some("fr")).starts_with("Missing"));
        }
    }

    #[test]
    fn test_missing_key() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.t("no-such-key", None), "Missing translation: no-such-key");
    }
}
