use crate::menu::DEFAULT_ROTATION_SPEED;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;
use vitrine::catalog::{ItemLabel, ProductId};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct MenuTitle(String);

vitrine::impl_string_newtype!(MenuTitle);

/// How wheel ticks move a ring: one discrete step per tick, or a free
/// spin the ring settles out of on its own.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum WheelMode {
    #[default]
    #[strum(to_string = "step", serialize = "notch")]
    Step,
    #[strum(to_string = "free", serialize = "continuous")]
    Free,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: Option<ItemLabel>,
    /// Catalog entry to pull label, payload and submenu variants from.
    pub product: Option<ProductId>,
    #[serde(default)]
    pub submenu: Vec<ItemConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuConfig {
    pub title: Option<MenuTitle>,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,
    #[serde(default)]
    pub wheel: WheelMode,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: None,
            rotation_speed: default_rotation_speed(),
            wheel: WheelMode::default(),
            items: Vec::new(),
        }
    }
}

fn default_rotation_speed() -> f64 {
    DEFAULT_ROTATION_SPEED
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rondel", "rondel").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<MenuConfig, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RONDEL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

fn setup_config() -> MenuConfig {
    MenuConfig {
        title: Some(MenuTitle::new("Rondel")),
        items: vec![ItemConfig {
            label: Some(ItemLabel::new("Setup")),
            product: None,
            submenu: Vec::new(),
        }],
        ..MenuConfig::default()
    }
}

pub fn load_or_setup() -> MenuConfig {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        return setup_config();
    }

    match load_config() {
        Ok(c) => c,
        Err(_) => setup_config(),
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::MenuEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<MenuEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(MenuEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
