//! リモートアクセス層
//!
//! ログイン・一覧取得・作成（multipart）・削除の4種類の呼び出しを抽象化する。
//! 認証が必要な呼び出しには必ずトークンを渡す。
//! ペイロードは構造として復号するだけで、内容の意味的な検証は呼び出し側で行う。

mod http;

pub use http::HttpApi;

use async_trait::async_trait;
use portfolio_admin_common::{
    Client, ClientForm, LoginRequest, PortfolioForm, PortfolioItem, SessionToken,
};
use std::fmt;
use thiserror::Error;

pub const LOGIN_PATH: &str = "/login";
pub const LIST_CLIENTS_PATH: &str = "/api/portfolio/getclientsadmin";
pub const LIST_PROJECTS_PATH: &str = "/api/portfolio/getProjects";
pub const ADD_CLIENT_PATH: &str = "/api/portfolio/addclient";
pub const ADD_PROJECT_PATH: &str = "/api/portfolio/addproject";
pub const DELETE_CLIENT_PATH: &str = "/api/portfolio/deleteclient";
pub const DELETE_PROJECT_PATH: &str = "/api/portfolio/deleteproject";

/// リモート呼び出しの失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("サービスに接続できません: {0}")]
    Unreachable(String),

    #[error("サービスがリクエストを拒否しました (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("レスポンスの形式が不正です: {0}")]
    Malformed(String),

    #[error("リクエストを組み立てられません: {0}")]
    Request(String),
}

impl RemoteError {
    /// トークン無効・期限切れ
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Rejected { status: 401 | 403, .. })
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// 管理対象のコレクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Projects,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Clients => write!(f, "クライアント一覧"),
            Collection::Projects => write!(f, "ポートフォリオ一覧"),
        }
    }
}

/// 作成APIの応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created<T> {
    /// 作成されたエンティティが返ってきた
    Entity(T),
    /// 受理のみ（本体なし）
    Acknowledged,
}

#[async_trait]
pub trait PortfolioApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> RemoteResult<SessionToken>;

    async fn list_clients(&self, token: &SessionToken) -> RemoteResult<Vec<Client>>;

    async fn list_projects(&self, token: &SessionToken) -> RemoteResult<Vec<PortfolioItem>>;

    async fn add_client(
        &self,
        token: &SessionToken,
        form: &ClientForm,
    ) -> RemoteResult<Created<Client>>;

    async fn add_project(
        &self,
        token: &SessionToken,
        form: &PortfolioForm,
    ) -> RemoteResult<Created<PortfolioItem>>;

    async fn delete_client(&self, token: &SessionToken, id: &str) -> RemoteResult<()>;

    async fn delete_project(&self, token: &SessionToken, id: &str) -> RemoteResult<()>;
}
