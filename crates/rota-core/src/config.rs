use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotaConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Accept a new drop for a volunteer whose previous move has not settled.
    #[serde(default)]
    pub allow_overlapping_drags: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Default output mode (`pretty`, `text` or `json`) below `FORMAT`.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub config: RotaConfig,
    pub user: UserConfig,
    pub resolved_api_url: String,
}

/// Load `<project_root>/.rota/config.toml`; `None` if the file is absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<RotaConfig>> {
    let path = project_root.join(".rota/config.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<RotaConfig>(&content)
        .map(Some)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `rota/config.toml` from the platform config dir, or defaults.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("rota/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project and user config and pick the API base URL.
///
/// A project file wins over the user's `[api]` table; `cli_api_url` and
/// then `ROTA_API_URL` win over both for the base URL.
///
/// # Errors
///
/// Propagates read and parse failures of either config file.
pub fn resolve_config(project_root: &Path, cli_api_url: Option<&str>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let config = project.unwrap_or_else(|| RotaConfig {
        api: user.api.clone().unwrap_or_default(),
        board: BoardConfig::default(),
    });

    let env_url = env::var("ROTA_API_URL").ok();
    let resolved_api_url = resolve_api_url(cli_api_url, env_url.as_deref(), &config.api.base_url);

    Ok(EffectiveConfig {
        config,
        user,
        resolved_api_url,
    })
}

fn resolve_api_url(cli: Option<&str>, env_url: Option<&str>, configured: &str) -> String {
    let pick = [cli, env_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(configured);
    pick.trim_end_matches('/').to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}
