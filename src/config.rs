use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub flow: FlowSettings,
}

/// Tuning of the incremental scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Wall-clock budget of one idle cycle.
    pub time_budget_ms: u64,
    /// Characters added per step when searching for context.
    pub stride: usize,
    /// Word starts required on each side of the dirty content.
    pub min_word_breaks: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            time_budget_ms: 50,
            stride: 32,
            min_word_breaks: 4,
        }
    }
}

/// Geometric thresholds of the fixed-to-flow reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Vertical overlap, relative to the smaller box, above which runs share a line.
    pub line_overlap: f64,
    /// Horizontal gap, relative to the larger box height, below which runs touch.
    pub adjacent_gap: f64,
    /// Area overlap at which a navigable path claims an element.
    pub hyperlink_overlap: f64,
    /// Vertical gap, in line heights, that starts a new paragraph.
    pub paragraph_gap: f64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            adjacent_gap: 0.05,
            hyperlink_overlap: 0.99,
            paragraph_gap: 0.8,
        }
    }
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en_US".to_string(),
            personal_dictionary: None,
            ignore_patterns: vec![
                r"\b[A-Z0-9_]{2,}\b".to_string(),    // ALL_CAPS
                r"https?://\S+".to_string(),         // URLs
                r"\b[a-fA-F0-9]{32,}\b".to_string(), // Hashes
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(), // Emails
            ],
            max_suggestions: 5,
            case_sensitive: false,
            scan: ScanSettings::default(),
            flow: FlowSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: String,
        personal_dict: Option<PathBuf>,
        cli_patterns: Vec<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(".flowspell.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        config.language = language;
        if let Some(dict) = personal_dict {
            config.personal_dictionary = Some(dict);
        }
        if !cli_patterns.is_empty() {
            config.ignore_patterns.extend(cli_patterns);
        }

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // other's values override self's if they differ from defaults
        if other.language != "en_US" {
            self.language = other.language;
        }
        if other.personal_dictionary.is_some() {
            self.personal_dictionary = other.personal_dictionary;
        }
        if !other.ignore_patterns.is_empty() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.scan != ScanSettings::default() {
            self.scan = other.scan;
        }
        if other.flow != FlowSettings::default() {
            self.flow = other.flow;
        }
        self.case_sensitive = other.case_sensitive;
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flowspell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flowspell").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flowspell").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "en_US");
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.scan.stride, 32);
        assert_eq!(config.flow.hyperlink_overlap, 0.99);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            language: "en_GB".to_string(),
            scan: ScanSettings {
                time_budget_ms: 5,
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.language, "en_GB");
        assert_eq!(merged.scan.time_budget_ms, 5);
        assert_eq!(merged.flow, FlowSettings::default());
    }

    #[test]
    fn test_partial_sections_from_toml() {
        let config: Config = toml::from_str(
            r#"
            language = "fr_FR"
            ignore_patterns = []

            [scan]
            min_word_breaks = 2

            [flow]
            line_overlap = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.min_word_breaks, 2);
        assert_eq!(config.scan.stride, 32);
        assert_eq!(config.flow.line_overlap, 0.6);
        assert_eq!(config.flow.adjacent_gap, 0.05);
    }
}
