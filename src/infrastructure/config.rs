use crate::domain::{
    config::{AppConfig, ChannelConfig, DeviceProfile, GlobalConfig},
    error::{ChannelError, ChannelResult},
};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".serlink";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Locate the global file under the user's config directory and the
    /// nearest project file above the current directory
    pub fn new() -> Self {
        Self {
            global_config_path: Self::default_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Use explicit locations instead of searching for them
    pub fn with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Load configuration: defaults, then the global file, then project
    /// devices appended after the global ones
    pub fn load_config(&self) -> ChannelResult<AppConfig> {
        let mut config = AppConfig::default();

        if let Some(global_path) = self.global_config_path.as_deref().filter(|p| p.exists()) {
            let global_config = Self::load_config_from_path(global_path)?;
            config.global = global_config.global;
            config.devices = global_config.devices;
        }

        if let Some(project_path) = self.project_config_path.as_deref().filter(|p| p.exists()) {
            let project_config = Self::load_config_from_path(project_path)?;
            config.devices.extend(project_config.devices);
        }

        Ok(config)
    }

    /// Global configuration path: `~/.config/serlink/config.toml`
    fn default_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("serlink").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        current_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .find(|path| path.exists())
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(path: &Path) -> ChannelResult<AppConfig> {
        let content = fs::read_to_string(path).map_err(|e| ChannelError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| ChannelError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(path: &Path, config: &AppConfig) -> ChannelResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| ChannelError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| ChannelError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create `.serlink/config.toml` under `path` with an example device
    pub fn init_project_config(path: &Path) -> ChannelResult<PathBuf> {
        let config_dir = path.join(CONFIG_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(ChannelError::Config {
                message: format!("Project configuration already exists: {}", config_file.display()),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| ChannelError::Config {
            message: format!("Failed to create {} directory: {}", CONFIG_DIR, e),
        })?;

        let default_config = AppConfig {
            global: GlobalConfig::default(),
            devices: vec![DeviceProfile {
                name: "example".to_string(),
                description: "Example serial device".to_string(),
                path: "/dev/ttyS2".to_string(),
                config: ChannelConfig::new(57600),
            }],
        };

        Self::save_config_to_path(&config_file, &default_config)?;
        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_config_path.as_deref()
    }

    /// Get the global config path (if a home directory is known)
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
