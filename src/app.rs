use adw::Application;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "gophish-groups.toml";

/// Connection settings shared by every request the app makes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    // Gophish generates a self-signed admin certificate on first start.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            accept_invalid_certs: default_accept_invalid_certs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppSettings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join(CONFIG_FILE))
    }

    /// Settings from the config file, with `GOPHISH_URL` / `GOPHISH_API_KEY` taking precedence.
    pub fn load() -> Self {
        let mut settings = Self::toml_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match toml::from_str::<AppSettings>(&text) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GOPHISH_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = crate::utils::normalize_url(&url);
        }
        if let Some(key) = lookup("GOPHISH_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::toml_path() {
            Some(path) => self.save_to(&path),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir")),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, toml)
    }
}

pub fn build_ui(app: &Application) {
    let settings = AppSettings::load();
    if settings.is_complete() {
        crate::ui::main_window::show_main_window(app, settings);
    } else {
        crate::ui::login::show_login_window(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let settings: AppSettings = toml::from_str("base_url = \"https://phish:3333\"").unwrap();
        assert_eq!(settings.base_url, "https://phish:3333");
        assert!(settings.api_key.is_empty());
        assert!(settings.accept_invalid_certs);
        assert_eq!(settings.timeout_secs, 10);
        assert!(!settings.is_complete());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let settings = AppSettings {
            base_url: "https://127.0.0.1:3333".into(),
            api_key: "0123abcd".into(),
            accept_invalid_certs: false,
            timeout_secs: 30,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "base_url = [").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = AppSettings {
            base_url: "https://old:3333".into(),
            api_key: "old".into(),
            ..AppSettings::default()
        };
        settings.apply_env(|key| match key {
            "GOPHISH_URL" => Some("10.0.0.5:3333".into()),
            "GOPHISH_API_KEY" => Some(" new-key ".into()),
            _ => None,
        });
        assert_eq!(settings.base_url, "https://10.0.0.5:3333");
        assert_eq!(settings.api_key, "new-key");
    }

    #[test]
    fn blank_environment_is_ignored() {
        let mut settings = AppSettings {
            api_key: "kept".into(),
            ..AppSettings::default()
        };
        settings.apply_env(|_| Some("   ".into()));
        assert_eq!(settings.api_key, "kept");
        assert!(settings.base_url.is_empty());
    }
}
