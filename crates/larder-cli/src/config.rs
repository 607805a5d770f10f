//! Configuration file management for larder.
//!
//! Provides a TOML-based config file at `~/.config/larder/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default. The
//! file holds the portal (and optionally shopping-service) credentials, so
//! it is written with 0600 permissions on Unix.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub portal: PortalSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping: Option<ShoppingSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortalSection {
    pub email: String,
    pub password: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShoppingSection {
    pub email: String,
    pub password: String,
}

fn default_country() -> String {
    "de".to_string()
}

fn default_language() -> String {
    "de-DE".to_string()
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the larder config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/larder` or `~/.config/larder`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("larder");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("larder")
}

/// Return the path to the larder config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix (it holds credentials).
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved portal credentials and locale, ready for login.
#[derive(Debug, Clone)]
pub struct ResolvedPortal {
    pub email: String,
    pub password: String,
    pub country: String,
    pub language: String,
}

/// Resolved shopping-service credentials.
#[derive(Debug, Clone)]
pub struct ResolvedShopping {
    pub email: String,
    pub password: String,
}

/// Resolve the portal configuration using the chain:
/// CLI flag > env var > config file > default.
///
/// - email: `cli_email` > `LARDER_EMAIL` > `portal.email` > error
/// - password: `LARDER_PASSWORD` > `portal.password` > error
/// - country: `cli_country` > `LARDER_COUNTRY` > `portal.country` > `de`
/// - language: `cli_language` > `LARDER_LANGUAGE` > `portal.language` > `de-DE`
pub fn resolve_portal(
    cli_email: Option<&str>,
    cli_country: Option<&str>,
    cli_language: Option<&str>,
) -> Result<ResolvedPortal> {
    let file_config = load_config().ok();
    let portal = file_config.as_ref().map(|c| &c.portal);

    let email = if let Some(email) = cli_email {
        email.to_string()
    } else if let Ok(email) = std::env::var("LARDER_EMAIL") {
        email
    } else if let Some(portal) = portal {
        portal.email.clone()
    } else {
        bail!("portal email not found; set LARDER_EMAIL or run `larder init`");
    };

    let password = if let Ok(password) = std::env::var("LARDER_PASSWORD") {
        password
    } else if let Some(portal) = portal {
        portal.password.clone()
    } else {
        bail!("portal password not found; set LARDER_PASSWORD or run `larder init`");
    };

    let country = cli_country
        .map(str::to_string)
        .or_else(|| std::env::var("LARDER_COUNTRY").ok())
        .or_else(|| portal.map(|p| p.country.clone()))
        .unwrap_or_else(default_country);

    let language = cli_language
        .map(str::to_string)
        .or_else(|| std::env::var("LARDER_LANGUAGE").ok())
        .or_else(|| portal.map(|p| p.language.clone()))
        .unwrap_or_else(default_language);

    Ok(ResolvedPortal {
        email,
        password,
        country,
        language,
    })
}

/// Resolve the shopping-service credentials:
/// env vars > config file > error.
pub fn resolve_shopping() -> Result<ResolvedShopping> {
    if let (Ok(email), Ok(password)) = (
        std::env::var("LARDER_SHOPPING_EMAIL"),
        std::env::var("LARDER_SHOPPING_PASSWORD"),
    ) {
        return Ok(ResolvedShopping { email, password });
    }

    let config = load_config().context("no shopping credentials in environment")?;
    let shopping = config.shopping.context(
        "shopping credentials not configured; set LARDER_SHOPPING_EMAIL/PASSWORD \
         or add a [shopping] section to the config file",
    )?;

    Ok(ResolvedShopping {
        email: shopping.email,
        password: shopping.password,
    })
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrips_through_toml() {
        let original = ConfigFile {
            portal: PortalSection {
                email: "koch@example.com".to_string(),
                password: "geheim".to_string(),
                country: "ch".to_string(),
                language: "de-CH".to_string(),
            },
            shopping: Some(ShoppingSection {
                email: "koch@example.com".to_string(),
                password: "bring".to_string(),
            }),
        };

        let contents = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.portal.email, original.portal.email);
        assert_eq!(loaded.portal.country, "ch");
        assert_eq!(loaded.shopping.unwrap().password, "bring");
    }

    #[test]
    fn locale_fields_default_when_absent() {
        let loaded: ConfigFile = toml::from_str(
            r#"
            [portal]
            email = "koch@example.com"
            password = "geheim"
            "#,
        )
        .unwrap();
        assert_eq!(loaded.portal.country, "de");
        assert_eq!(loaded.portal.language, "de-DE");
        assert!(loaded.shopping.is_none());
    }

    #[test]
    fn shopping_section_is_omitted_when_none() {
        let config = ConfigFile {
            portal: PortalSection {
                email: "a@b".to_string(),
                password: "c".to_string(),
                country: default_country(),
                language: default_language(),
            },
            shopping: None,
        };
        let contents = toml::to_string_pretty(&config).unwrap();
        assert!(!contents.contains("[shopping]"));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("larder/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
