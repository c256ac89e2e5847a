use chrono::Local;
use directories::BaseDirs;
use ini::{Ini, ParseError};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::ForecastRequest;

/// Region used when neither the settings file nor the command line names one (Hamburg).
pub const DEFAULT_POSTAL_CODE: u32 = 20095;

/// File name of the settings file inside the platform config directory.
pub const SETTINGS_FILE_NAME: &str = "pollenflug.ini";

/// Section holding the settings; keys outside any section are read too.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid postal code in settings file: {0:?}")]
    InvalidPostalCode(String),

    #[error("invalid value for `debug` in settings file: {0:?}")]
    InvalidDebugFlag(String),

    #[error("invalid value for `en` in settings file: {0:?}")]
    InvalidLanguageFlag(String),

    #[error("failed to parse settings file {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Built-in values, the lowest precedence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub postal_code: u32,
    pub date: String,
    pub use_english_labels: bool,
    pub verbose: bool,
}

impl Defaults {
    /// Defaults with the date set to today's local date.
    pub fn today() -> Self {
        Self::for_date(Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            postal_code: DEFAULT_POSTAL_CODE,
            date: date.into(),
            use_english_labels: false,
            verbose: false,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::today()
    }
}

/// Raw key/value layer read from the settings file.
///
/// Values are kept as text; they are validated by [`resolve`].
///
/// Example:
/// ```ini
/// [DEFAULT]
/// plz = 55555
/// debug = True
/// en = false
/// ```
/// Keys outside of any section are read as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSettings {
    pub plz: Option<String>,
    pub debug: Option<String>,
    pub en: Option<String>,
}

impl PersistedSettings {
    /// Parse settings from INI text. Unknown keys and sections are ignored.
    pub fn parse(contents: &str) -> Result<Self, ParseError> {
        let ini = Ini::load_from_str(contents)?;
        let section = ini.section(Some(DEFAULT_SECTION));

        let lookup = |key: &str| {
            section
                .and_then(|s| s.get(key))
                .or_else(|| ini.general_section().get(key))
                .map(str::to_string)
        };

        Ok(Self {
            plz: lookup("plz"),
            debug: lookup("debug"),
            en: lookup("en"),
        })
    }

    /// Load settings from `path`.
    ///
    /// Returns `None` if the file doesn't exist or can't be read.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file");
            return Ok(None);
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable settings file");
                return Ok(None);
            }
        };

        let settings = Self::parse(&contents).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?settings, "loaded settings file");
        Ok(Some(settings))
    }

    /// Path to the settings file, e.g. `~/.config/pollenflug.ini` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }
}

/// Values given on the command line, the highest precedence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub date: Option<String>,
    pub postal_code: Option<String>,
    pub verbose: bool,
    pub english: bool,
}

/// Fully populated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub postal_code: String,
    pub date: String,
    pub use_english_labels: bool,
    pub verbose: bool,
    /// Set only when the date came from the command line.
    pub request_history: bool,
}

impl ResolvedConfig {
    pub fn request(&self) -> ForecastRequest {
        ForecastRequest {
            date: self.date.clone(),
            postal_code: self.postal_code.clone(),
            history: self.request_history,
        }
    }
}

/// Merge defaults, persisted settings and command line overrides, later layers winning.
///
/// A missing settings file (`settings == None`) switches English labels on,
/// while a present file without an `en` key leaves the default untouched.
pub fn resolve(
    defaults: &Defaults,
    settings: Option<&PersistedSettings>,
    overrides: &CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let mut postal_code = defaults.postal_code.to_string();
    let mut use_english_labels = defaults.use_english_labels;
    let mut verbose = defaults.verbose;

    match settings {
        None => {
            debug!("no persisted settings, using English labels");
            use_english_labels = true;
        }
        Some(settings) => {
            if let Some(raw) = &settings.plz {
                let plz = raw.trim();
                if plz.is_empty() || !plz.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ConfigError::InvalidPostalCode(raw.clone()));
                }
                // kept as written, leading zeros are part of German postal codes
                postal_code = plz.to_string();
            }
            if let Some(raw) = &settings.debug {
                verbose =
                    parse_flag(raw).ok_or_else(|| ConfigError::InvalidDebugFlag(raw.clone()))?;
            }
            if let Some(raw) = &settings.en {
                use_english_labels =
                    parse_flag(raw).ok_or_else(|| ConfigError::InvalidLanguageFlag(raw.clone()))?;
            }
        }
    }

    let (date, request_history) = match &overrides.date {
        Some(date) => (date.clone(), true),
        None => (defaults.date.clone(), false),
    };

    if let Some(plz) = &overrides.postal_code {
        postal_code = plz.clone();
    }

    let config = ResolvedConfig {
        postal_code,
        date,
        use_english_labels: use_english_labels || overrides.english,
        verbose: verbose || overrides.verbose,
        request_history,
    };

    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Boolean tokens accepted in the settings file, compared case-insensitively.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    }
}
