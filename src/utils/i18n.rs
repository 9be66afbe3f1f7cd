use tracing::{info, warn};

/// Locales with translation files under `locales/`
pub const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

/// Fallback when the configured locale is not supported
pub const DEFAULT_LOCALE: &str = "en";

/// Map a configured locale such as `de_DE.UTF-8` or `DE` onto a supported one
pub fn resolve_locale(locale: &str) -> &'static str {
    let language = locale
        .split(|c: char| c == '_' || c == '-' || c == '.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| *supported == language)
        .unwrap_or(DEFAULT_LOCALE)
}

/// Set the process-wide locale used by `t!` without an explicit locale
pub fn set_locale(locale: &str) -> &'static str {
    let resolved = resolve_locale(locale);
    if !locale.eq_ignore_ascii_case(resolved) {
        warn!("Locale '{}' resolved to '{}'", locale, resolved);
    }
    rust_i18n::set_locale(resolved);
    info!("Using locale: {}", resolved);
    resolved
}
