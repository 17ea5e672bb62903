// Configuration loading and parsing (dugout.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable overriding `[api] base_url`.
pub const ENV_API_URL: &str = "DUGOUT_API_URL";
/// Environment variable overriding the credentials token.
pub const ENV_API_TOKEN: &str = "DUGOUT_API_TOKEN";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiSection,
    pub export: ExportSection,
    pub ui: UiSection,
    pub credentials: CredentialsConfig,
}

/// Raw deserialization target for dugout.toml.
#[derive(Debug, Clone, Deserialize)]
struct DugoutFile {
    api: ApiSection,
    export: ExportSection,
    #[serde(default)]
    ui: UiSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSection {
    #[serde(default)]
    pub directory: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSection {
    pub tick_ms: u64,
}

impl Default for UiSection {
    fn default() -> Self {
        UiSection { tick_ms: 100 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub api_token: Option<String>,
}

impl Config {
    /// Directory exported CSV files are written to. An empty setting means
    /// the user's download directory, then the working directory.
    pub fn export_dir(&self) -> PathBuf {
        let configured = self.export.directory.trim();
        if !configured.is_empty() {
            return PathBuf::from(configured);
        }
        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Target of a local (client-side) export.
    pub fn export_path(&self) -> PathBuf {
        self.export_dir().join(&self.export.file_name)
    }

    /// Target of a server-side export: `<stem>_server.csv` next to the local
    /// file.
    pub fn server_export_path(&self) -> PathBuf {
        let stem = Path::new(&self.export.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export");
        self.export_dir().join(format!("{stem}_server.csv"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dugout.toml` and (optionally)
/// `config/credentials.toml`, relative to `base_dir`. Environment overrides
/// are not applied.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_with(base_dir, |_| None)
}

/// Like `load_config_from`, with `env` consulted for the override variables.
pub(crate) fn load_config_with(
    base_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- dugout.toml (required) ---
    let main_path = config_dir.join("dugout.toml");
    let main_text = read_file(&main_path)?;
    let file: DugoutFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let mut config = Config {
        api: file.api,
        export: file.export,
        ui: file.ui,
        credentials,
    };
    apply_env_overrides(&mut config, env);
    validate(&config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    if let Some(token) = env(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
        config.credentials.api_token = Some(token.trim().to_string());
    }
}

/// Files seeded into `config/` on first run: (name in `defaults/`, name in
/// `config/`).
const SEED_FILES: &[(&str, &str)] = &[
    ("dugout.toml", "dugout.toml"),
    ("credentials.toml.example", "credentials.toml"),
];

/// Seed missing `config/` files from `defaults/`. Existing files are never
/// touched. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(seed_error(format!(
            "no defaults/ or config/ directory in {}",
            base_dir.display()
        )));
    }
    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    for (source_name, target_name) in SEED_FILES {
        let source = defaults_dir.join(source_name);
        let target = config_dir.join(target_name);
        if target.exists() || !source.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&source)
            .map_err(|e| seed_error(format!("cannot read {}: {e}", source.display())))?;
        let text = if source_name.ends_with(".example") {
            comment_out(&text)
        } else {
            text
        };
        std::fs::write(&target, text)
            .map_err(|e| seed_error(format!("cannot write {}: {e}", target.display())))?;
        info!(path = %target.display(), "Seeded config file");
        seeded.push(target);
    }
    Ok(seeded)
}

/// Template settings are seeded commented out, so the development token stays
/// in effect until the user fills one in.
fn comment_out(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the working directory, seeding missing files from
/// `defaults/` and applying environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_with(&cwd, |key| std::env::var(key).ok())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("must be an http:// or https:// URL, got {url:?}"),
        });
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let file_name = config.export.file_name.trim();
    if file_name.is_empty() || !file_name.ends_with(".csv") {
        return Err(ConfigError::ValidationError {
            field: "export.file_name".into(),
            message: format!("must be a non-empty name ending in .csv, got {file_name:?}"),
        });
    }

    let tick = config.ui.tick_ms;
    if !(10..=1000).contains(&tick) {
        return Err(ConfigError::ValidationError {
            field: "ui.tick_ms".into(),
            message: format!("must be between 10 and 1000, got {tick}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
