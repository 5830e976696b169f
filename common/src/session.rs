//! セッションゲート
//!
//! 未認証/認証済みの2状態のみ。コレクション操作はすべて認証済みでのみ有効。

use crate::error::{Error, Result};
use crate::types::LoginRequest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    state: AuthState,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// 認証済みへ遷移
    ///
    /// 未認証からの遷移時のみ `true`（この時だけ両ミラーを再取得する）
    pub fn open(&mut self) -> bool {
        let entered = self.state == AuthState::Unauthenticated;
        self.state = AuthState::Authenticated;
        entered
    }

    /// トークンが拒否されたら未認証へ戻す。次の `open` は再び遷移として扱う
    pub fn close(&mut self) {
        self.state = AuthState::Unauthenticated;
    }
}

/// ログイン入力の事前チェック（空なら通信しない）
pub fn credentials(username: &str, password: &str) -> Result<LoginRequest> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(Error::Validation(
            "Please provide both username and password.".into(),
        ));
    }

    Ok(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}
