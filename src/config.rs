use crate::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.rounak.co";
pub const BASE_URL_ENV: &str = "PORTFOLIO_ADMIN_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 接続先サービスのベースURL
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AdminError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("portfolio-admin"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 接続先を決定（引数 > 環境変数 > 設定ファイル）
    pub fn resolve_base_url(&self, override_url: Option<&str>) -> String {
        if let Some(url) = override_url.filter(|u| !u.trim().is_empty()) {
            return url.trim().to_string();
        }

        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.base_url.clone(),
        }
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        self.base_url = url;
        self.save()
    }
}
