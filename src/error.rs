use crate::remote::{Collection, RemoteError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    /// 送信前チェックで弾かれた（通信なし）
    #[error("入力エラー: {0}")]
    Validation(String),

    /// ログイン拒否、またはトークンの無効・期限切れ
    #[error("認証に失敗しました: {0}")]
    Auth(#[source] RemoteError),

    #[error("ログインしていません。`portfolio-admin login` でログインしてください")]
    NotAuthenticated,

    #[error("{collection}の取得に失敗しました: {source}")]
    Fetch {
        collection: Collection,
        #[source]
        source: RemoteError,
    },

    #[error("{action}に失敗しました: {source}")]
    Write {
        action: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力プロンプトエラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(portfolio_admin_common::Error),
}

impl AdminError {
    /// 通信前に弾かれたエラーか
    pub fn is_local(&self) -> bool {
        matches!(self, AdminError::Validation(_) | AdminError::NotAuthenticated)
    }
}

// 共通ライブラリの検証エラーは入力エラーとして扱う
impl From<portfolio_admin_common::Error> for AdminError {
    fn from(err: portfolio_admin_common::Error) -> Self {
        match err {
            portfolio_admin_common::Error::Validation(msg) => AdminError::Validation(msg),
            other => AdminError::Common(other),
        }
    }
}

impl From<dialoguer::Error> for AdminError {
    fn from(err: dialoguer::Error) -> Self {
        AdminError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
