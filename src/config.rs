//! Boot menu configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Flavor messages every entry draws from
pub const DEFAULT_FILLER: &[&str] = &[
    "Loading device drivers...",
    "Calibrating flux capacitor...",
    "Negotiating with caches...",
    "Dusting off floppy drives...",
    "Optimizing coffee-to-code ratio...",
    "Spinning up hamster wheel...",
    "Untangling ethernet cables...",
    "Warming up CRT glow...",
    "Patching memory leaks with duct tape...",
    "Reticulating splines...",
];

/// Extra messages only special entries draw from
pub const DEFAULT_SPECIAL_EXTRAS: &[&str] = &[
    "Checking kernel integrity...",
    "Priming bootloader vectors...",
    "Mounting root filesystem...",
    "Starting init process...",
    "Enabling VGA text mode...",
];

/// Config file name under the user config directory
const CONFIG_FILE: &str = "bootsys/menu.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse menu config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize menu config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("boot menu has no entries")]
    NoEntries,
    #[error("entry {index} has an empty name")]
    EmptyName { index: usize },
    #[error("{field} must be greater than zero")]
    InvalidValue { field: &'static str },
}

/// A single menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Marks the entry the cursor starts on
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl BootEntry {
    pub fn new(name: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            name: name.into(),
            url: url.map(str::to_string),
            description: None,
            selected: false,
        }
    }

    /// Redirect target, treating a blank url as unset
    pub fn target(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Menu-wide behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSettings {
    #[serde(default = "default_title")]
    pub title: String,

    /// Prefix status lines with `[HH:MM:SS]`
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Entry names (case-insensitive) that get the extended boot sequence
    #[serde(default = "default_special")]
    pub special: Vec<String>,

    /// Blackout duration before navigating
    #[serde(default = "default_redirect_ms")]
    pub redirect_ms: u64,

    /// Delay between pressing Esc and the exit dialog
    #[serde(default = "default_exit_delay_ms")]
    pub exit_delay_ms: u64,

    /// Boot log lines kept for display
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Leave the program once the exit dialog is acknowledged
    #[serde(default)]
    pub quit_on_exit: bool,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            timestamps: true,
            special: default_special(),
            redirect_ms: default_redirect_ms(),
            exit_delay_ms: default_exit_delay_ms(),
            log_capacity: default_log_capacity(),
            quit_on_exit: false,
        }
    }
}

/// Message pools for the boot sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSettings {
    #[serde(default = "default_filler")]
    pub filler: Vec<String>,
    #[serde(default = "default_special_extras")]
    pub special: Vec<String>,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            filler: default_filler(),
            special: default_special_extras(),
        }
    }
}

/// Complete menu configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootConfig {
    #[serde(default)]
    pub menu: MenuSettings,
    #[serde(default)]
    pub messages: MessageSettings,
    #[serde(default, rename = "entry")]
    pub entries: Vec<BootEntry>,
}

impl Default for BootConfig {
    fn default() -> Self {
        let mut jsos = BootEntry::new("JSOS", None);
        jsos.description = Some(String::from("Operating system in a browser tab"));
        jsos.selected = true;

        let mut playground = BootEntry::new("Playground", None);
        playground.description = Some(String::from("Scratch projects and experiments"));

        let mut localhost = BootEntry::new("Localhost", Some("http://127.0.0.1/"));
        localhost.description = Some(String::from("There is no place like it"));

        Self {
            menu: MenuSettings::default(),
            messages: MessageSettings::default(),
            entries: vec![jsos, playground, localhost],
        }
    }
}

impl BootConfig {
    /// Default config location (`~/.config/bootsys/menu.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// yields the built-in menu.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_or_default(path, Self::default_path())
    }

    fn load_or_default(path: Option<&Path>, fallback: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match fallback {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::NoEntries);
        }
        if let Some(index) = self.entries.iter().position(|e| e.name.trim().is_empty()) {
            return Err(ConfigError::EmptyName { index });
        }
        if self.menu.redirect_ms == 0 {
            return Err(ConfigError::InvalidValue { field: "menu.redirect_ms" });
        }
        if self.menu.exit_delay_ms == 0 {
            return Err(ConfigError::InvalidValue { field: "menu.exit_delay_ms" });
        }
        if self.menu.log_capacity == 0 {
            return Err(ConfigError::InvalidValue { field: "menu.log_capacity" });
        }
        Ok(())
    }

    /// First entry marked `selected`, else 0
    pub fn initial_cursor(&self) -> usize {
        self.entries.iter().position(|e| e.selected).unwrap_or(0)
    }

    /// Case-insensitive match against the configured special names
    pub fn special_predicate(&self) -> impl Fn(&BootEntry) -> bool + 'static {
        let keywords: Vec<String> = self
            .menu
            .special
            .iter()
            .map(|k| k.trim().to_lowercase())
            .collect();
        move |entry: &BootEntry| {
            let name = entry.name.trim().to_lowercase();
            keywords.iter().any(|k| *k == name)
        }
    }
}

impl FromStr for BootConfig {
    type Err = ConfigError;

    /// Parse and validate TOML text
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: BootConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "BOOT.SYS".to_string()
}

fn default_special() -> Vec<String> {
    vec!["jsos".to_string()]
}

fn default_redirect_ms() -> u64 {
    600
}

fn default_exit_delay_ms() -> u64 {
    1000
}

fn default_log_capacity() -> usize {
    64
}

fn default_filler() -> Vec<String> {
    DEFAULT_FILLER.iter().map(|m| m.to_string()).collect()
}

fn default_special_extras() -> Vec<String> {
    DEFAULT_SPECIAL_EXTRAS.iter().map(|m| m.to_string()).collect()
}
