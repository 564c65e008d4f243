//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/trackops/trackops.toml`
//! 3. Local config: `<workspace>/.trackops.toml`
//! 4. Environment variables: `TRACKOPS_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{CompanyProfile, DEFAULT_REMINDERS, MAX_LEVEL};

/// WBS outline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutlineConfig {
    /// Deepest allowed nesting level (root is 0)
    pub max_level: usize,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
        }
    }
}

/// Deadline planner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of entries in the upcoming list
    pub upcoming_limit: usize,
    /// Window for the "due soon" count, in days
    pub horizon_days: i64,
    /// Reminder offsets in days relative to the deadline date
    pub default_reminders: Vec<i64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            upcoming_limit: 6,
            horizon_days: 30,
            default_reminders: DEFAULT_REMINDERS.to_vec(),
        }
    }
}

/// Slack incoming-webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlackConfig {
    pub webhook: Option<String>,
}

/// Raw company config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCompanyConfig {
    pub name: Option<String>,
    pub stage: Option<String>,
    pub capabilities: Option<String>,
    pub naics: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutlineConfig {
    pub max_level: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPlannerConfig {
    pub upcoming_limit: Option<usize>,
    pub horizon_days: Option<i64>,
    pub default_reminders: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSlackConfig {
    pub webhook: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub editor: Option<String>,
    pub outline: RawOutlineConfig,
    pub planner: RawPlannerConfig,
    pub company: RawCompanyConfig,
    pub slack: RawSlackConfig,
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for item in overlay {
        if let Some(negated) = item.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(item.clone());
        }
    }

    // sorted for deterministic output
    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

/// Unified configuration for trackops.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the JSON store files
    pub data_dir: PathBuf,
    /// Editor command (default: $EDITOR or "vim")
    pub editor: String,
    pub outline: OutlineConfig,
    pub planner: PlannerConfig,
    /// Profile used to rank opportunities
    pub company: CompanyProfile,
    pub slack: SlackConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".into());

        Self {
            data_dir: default_data_dir(),
            editor,
            outline: OutlineConfig::default(),
            planner: PlannerConfig::default(),
            company: CompanyProfile::default(),
            slack: SlackConfig::default(),
        }
    }
}

/// Platform data directory, falling back to `~/.trackops`.
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "trackops")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.trackops"))
}

/// Get the XDG config directory for trackops.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "trackops").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("trackops.toml"))
}

/// Get the path to the local config file in a workspace directory.
pub fn local_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".trackops.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
fn expand(input: &str) -> String {
    shellexpand::full(input)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

impl Settings {
    pub fn outline_path(&self) -> PathBuf {
        self.data_dir.join("outline.json")
    }

    pub fn deadlines_path(&self) -> PathBuf {
        self.data_dir.join("deadlines.json")
    }

    pub fn opportunities_path(&self) -> PathBuf {
        self.data_dir.join("opportunities.json")
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);

        self.editor = expand(&self.editor);
    }

    /// Merge overlay config onto self (base) with union semantics for string arrays.
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Company NAICS / keywords: union merge with negation support
    /// - Reminder offsets: replaced, they are an ordered schedule
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let union = |base: &[String], over: &Option<Vec<String>>| {
            over.as_ref()
                .map(|o| merge_array(base, o))
                .unwrap_or_else(|| base.to_vec())
        };
        let mut merged = self.apply_scalars(overlay);
        merged.company.naics = union(&self.company.naics, &overlay.company.naics);
        merged.company.keywords = union(&self.company.keywords, &overlay.company.keywords);
        merged
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        let mut merged = self.apply_scalars(global);
        if let Some(naics) = &global.company.naics {
            merged.company.naics = naics.clone();
        }
        if let Some(keywords) = &global.company.keywords {
            merged.company.keywords = keywords.clone();
        }
        merged
    }

    fn apply_scalars(&self, raw: &RawSettings) -> Self {
        let mut next = self.clone();
        if let Some(data_dir) = &raw.data_dir {
            next.data_dir = data_dir.clone();
        }
        if let Some(editor) = &raw.editor {
            next.editor = editor.clone();
        }
        if let Some(max_level) = raw.outline.max_level {
            next.outline.max_level = max_level;
        }
        if let Some(limit) = raw.planner.upcoming_limit {
            next.planner.upcoming_limit = limit;
        }
        if let Some(days) = raw.planner.horizon_days {
            next.planner.horizon_days = days;
        }
        if let Some(reminders) = &raw.planner.default_reminders {
            next.planner.default_reminders = reminders.clone();
        }
        let company = &raw.company;
        if let Some(name) = &company.name {
            next.company.name = name.clone();
        }
        if let Some(stage) = &company.stage {
            next.company.stage = stage.clone();
        }
        if let Some(capabilities) = &company.capabilities {
            next.company.capabilities = capabilities.clone();
        }
        if let Some(webhook) = &raw.slack.webhook {
            next.slack.webhook = Some(webhook.clone());
        }
        next
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `workspace` - Optional workspace directory for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/trackops/trackops.toml` (arrays REPLACE defaults)
    /// 3. Local config: `<workspace>/.trackops.toml` (arrays UNION with global)
    /// 4. Environment variables: `TRACKOPS_*` prefix (REPLACES - explicit override)
    ///
    /// A relative `data_dir` is resolved against the workspace.
    pub fn load(workspace: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = workspace.map(local_config_path).filter(|p| p.exists());
        Self::load_from(global.as_deref(), local.as_deref(), workspace)
    }

    /// Layered load from explicit file locations.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
        workspace: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global {
            let raw = load_raw_settings(path)?;
            current = current.apply_global(&raw);
        }

        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        if let Some(ws) = workspace {
            if current.data_dir.is_relative() {
                current.data_dir = ws.join(&current.data_dir);
            }
        }

        Ok(current)
    }

    /// Apply TRACKOPS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("TRACKOPS")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("company.naics")
                .with_list_parse_key("company.keywords")
                .with_list_parse_key("planner.default_reminders")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("editor") {
            settings.editor = val;
        }
        if let Ok(val) = config.get::<usize>("outline.max_level") {
            settings.outline.max_level = val;
        }
        if let Ok(val) = config.get::<usize>("planner.upcoming_limit") {
            settings.planner.upcoming_limit = val;
        }
        if let Ok(val) = config.get::<i64>("planner.horizon_days") {
            settings.planner.horizon_days = val;
        }
        if let Ok(val) = config.get::<Vec<i64>>("planner.default_reminders") {
            settings.planner.default_reminders = val;
        }
        if let Ok(val) = config.get_string("company.name") {
            settings.company.name = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("company.naics") {
            settings.company.naics = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("company.keywords") {
            settings.company.keywords = val;
        }
        if let Ok(val) = config.get_string("slack.webhook") {
            settings.slack.webhook = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# trackops configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/trackops/trackops.toml  (defines your baseline)
#   Local:  <workspace>/.trackops.toml        (workspace-specific additions)
#   Env:    TRACKOPS_* environment variables   (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global for company naics/keywords.
#   Use "!item" in local config to REMOVE an inherited item:
#     naics = ["541715", "!541330"]

# Directory for outline.json, deadlines.json, opportunities.json
# data_dir = "~/.local/share/trackops"

# Editor for `trackops config edit`
# editor = "vim"

[outline]
# Deepest nesting level for WBS items (root is 0)
# max_level = 5

[planner]
# Entries shown by `trackops deadline upcoming`
# upcoming_limit = 6
# Window in days for the "due soon" count
# horizon_days = 30
# Reminder offsets in days relative to each deadline
# default_reminders = [-7, -1]

[company]
# name = "Acme Robotics"
# stage = "seed"
# capabilities = "autonomy, edge compute"
# naics = ["541715", "541330"]
# keywords = ["autonomy", "edge"]

[slack]
# Incoming webhook used in generated reminder commands
# webhook = "https://hooks.slack.com/services/..."
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
