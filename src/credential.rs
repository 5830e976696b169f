//! セッショントークン保存モジュール
//!
//! 固定キー `authToken` の下にトークンを1つだけ保存し、再起動後も読み出せるようにする。
//! トークンの書き込みはログイン成功時のみ。

use crate::config::Config;
use crate::error::Result;
use portfolio_admin_common::SessionToken;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const TOKEN_KEY: &str = "authToken";

const SESSION_FILE_NAME: &str = "session.json";

/// トークンの保存先
pub trait TokenStore: Send {
    fn load(&self) -> Result<Option<SessionToken>>;
    fn save(&mut self, token: &SessionToken) -> Result<()>;
}

/// JSONファイルに保存するストア
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/portfolio-admin/session.json`
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::config_dir()?.join(SESSION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // 壊れたファイルは空として扱う（次回ログインで上書き）
    fn read_entries(&self) -> Map<String, Value> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Map::new();
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(path = %self.path.display(), "session file unreadable, ignoring");
                Map::new()
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>> {
        let entries = self.read_entries();
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new))
    }

    fn save(&mut self, token: &SessionToken) -> Result<()> {
        let mut entries = self.read_entries();
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.as_str().to_string()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// プロセス内だけで保持するストア
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<SessionToken>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &SessionToken) -> Result<()> {
        self.token = Some(token.clone());
        Ok(())
    }
}
