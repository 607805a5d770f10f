//! Portal localization: country/language resolution, portal domains, and
//! recipe URL construction.
//!
//! The portal runs one storefront per country; recipe links and the search
//! page (where the session API key is scraped from) are both derived from
//! the country's domain.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// A resolved (country, language) pair for one planning session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Two-letter country code, e.g. `de`, `ch`.
    pub country: String,
    /// BCP-47 language tag, e.g. `de-DE`.
    pub language: String,
}

/// Known storefronts and the language tags each one serves.
const PORTAL_LOCALES: &[(&str, &[&str])] = &[
    ("de", &["de-DE"]),
    ("at", &["de-AT", "de-DE"]),
    ("ch", &["de-CH", "fr-CH", "it-CH"]),
    ("gb", &["en-GB"]),
    ("us", &["en-US", "es-US"]),
];

/// Resolve a country/language request against the known storefronts.
///
/// An exact language match wins; a known country with an unknown language
/// falls back to that country's first language (mirroring the portal's own
/// fallback). An unknown country is an error.
pub fn resolve_localization(country: &str, language: &str) -> Result<Locale, PlannerError> {
    let country = country.trim().to_lowercase();
    let languages = PORTAL_LOCALES
        .iter()
        .find(|(c, _)| *c == country)
        .map(|(_, langs)| *langs)
        .ok_or_else(|| PlannerError::LocalizationUnavailable {
            country: country.clone(),
            language: language.to_string(),
        })?;

    let resolved = languages
        .iter()
        .find(|l| l.eq_ignore_ascii_case(language))
        .unwrap_or(&languages[0]);

    Ok(Locale {
        country,
        language: (*resolved).to_string(),
    })
}

/// Map a country code to its portal domain.
pub fn portal_domain(country: &str) -> String {
    match country {
        "de" => "cookidoo.de".to_string(),
        "at" => "cookidoo.at".to_string(),
        "ch" => "cookidoo.ch".to_string(),
        "gb" => "cookidoo.co.uk".to_string(),
        "us" => "cookidoo.thermomix.com".to_string(),
        other => format!("cookidoo.{other}"),
    }
}

/// Build the public URL for a recipe in the given locale.
pub fn recipe_url(locale: &Locale, recipe_id: &str) -> String {
    format!(
        "https://{}/recipes/recipe/{}/{}",
        portal_domain(&locale.country),
        locale.language,
        recipe_id
    )
}

/// Build the search-page URL whose response body carries the session
/// API key for the search index.
pub fn search_page_url(locale: &Locale) -> String {
    format!(
        "https://{}/search/{}",
        portal_domain(&locale.country),
        locale.language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_locale_resolves() {
        let locale = resolve_localization("de", "de-DE").unwrap();
        assert_eq!(locale.country, "de");
        assert_eq!(locale.language, "de-DE");
    }

    #[test]
    fn unknown_language_falls_back_to_country_default() {
        let locale = resolve_localization("ch", "pt-BR").unwrap();
        assert_eq!(locale.language, "de-CH");
    }

    #[test]
    fn unknown_country_is_an_error() {
        let err = resolve_localization("zz", "de-DE").unwrap_err();
        assert!(matches!(
            err,
            PlannerError::LocalizationUnavailable { .. }
        ));
    }

    #[test]
    fn country_code_is_normalized() {
        let locale = resolve_localization(" DE ", "de-DE").unwrap();
        assert_eq!(locale.country, "de");
    }

    #[test]
    fn recipe_url_uses_portal_domain() {
        let locale = resolve_localization("gb", "en-GB").unwrap();
        assert_eq!(
            recipe_url(&locale, "r907015"),
            "https://cookidoo.co.uk/recipes/recipe/en-GB/r907015"
        );
    }

    #[test]
    fn unknown_country_domain_is_derived() {
        assert_eq!(portal_domain("fr"), "cookidoo.fr");
    }
}
