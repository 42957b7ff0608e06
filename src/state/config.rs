use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const MAX_RECENT_PROJECTS: usize = 10;

fn default_true() -> bool {
    true
}

fn default_zoom() -> f32 {
    1.0
}

/// App configuration stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub recent_projects: Vec<String>,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recent_projects: Vec::new(),
            show_grid: true,
            default_zoom: 1.0,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(|appdata| {
                PathBuf::from(appdata)
                    .join("SpriteStudio")
                    .join("config.json")
            })
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("sprite-studio")
                    .join("config.json")
            })
        }
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(&path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(&path, json);
            }
        }
    }

    fn push_recent(&mut self, path: &str) {
        // Remove if already exists (to move to front)
        self.recent_projects.retain(|p| p != path);
        self.recent_projects.insert(0, path.to_string());
        self.recent_projects.truncate(MAX_RECENT_PROJECTS);
    }

    pub fn add_recent(&mut self, path: &str) {
        self.push_recent(path);
        self.save();
    }

    pub fn remove_recent(&mut self, path: &str) {
        self.recent_projects.retain(|p| p != path);
        self.save();
    }
}
