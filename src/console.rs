//! セッション付きデータ同期コントローラ
//!
//! 認証状態・2つのコレクションミラー・2つの入力バッファを1つのコンテキストに保持する。
//!
//! - ログイン成功（未認証→認証済み）で両ミラーを並行して再取得
//! - 追加・削除はサーバーの成功応答を受けてからローカルへ反映（楽観的更新なし）
//! - 失敗時はミラーも入力バッファも変更しない
//! - サービスがトークンを拒否（401/403）したら未認証に戻る

use crate::credential::TokenStore;
use crate::error::{AdminError, Result};
use crate::remote::{Collection, Created, PortfolioApi, RemoteError, RemoteResult};
use portfolio_admin_common::{
    credentials, AuthState, Client, ClientDraft, CollectionMirror, Entity, PortfolioDraft,
    PortfolioItem, SessionGate, SessionToken, StagingBuffer,
};
use std::future::Future;

/// 削除前の確認
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// 事前に回答済み（`--yes` など）
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(*self)
    }
}

/// 両ミラー再取得の結果。片方の失敗はもう片方に影響しない
#[derive(Debug)]
pub struct RefreshReport {
    pub clients: Result<usize>,
    pub projects: Result<usize>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.clients.is_ok() && self.projects.is_ok()
    }

    pub fn errors(&self) -> impl Iterator<Item = &AdminError> {
        [self.clients.as_ref().err(), self.projects.as_ref().err()]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug)]
pub enum AddOutcome<T> {
    /// サーバーが返したエンティティを末尾に追加した
    Appended(T),
    /// 受理応答のみだったため一覧を再取得した。
    /// 書き込みは成功済みなので、再取得の失敗はここに入る
    Refreshed(Result<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// 確認で中止（通信なし）
    Declined,
    Removed,
    /// サーバー側は成功したがローカルに該当なし
    NotPresent,
}

const ADD_CLIENT: &str = "クライアントの追加";
const ADD_PROJECT: &str = "ポートフォリオ作品の追加";
const DELETE_CLIENT: &str = "クライアントの削除";
const DELETE_PROJECT: &str = "ポートフォリオ作品の削除";

pub struct Console<A, S> {
    api: A,
    tokens: S,
    gate: SessionGate,
    clients: CollectionMirror<Client>,
    projects: CollectionMirror<PortfolioItem>,
    client_draft: StagingBuffer<ClientDraft>,
    project_draft: StagingBuffer<PortfolioDraft>,
}

impl<A: PortfolioApi, S: TokenStore> Console<A, S> {
    /// 未認証・空の状態で開始
    pub fn new(api: A, tokens: S) -> Self {
        Self {
            api,
            tokens,
            gate: SessionGate::new(),
            clients: CollectionMirror::new(),
            projects: CollectionMirror::new(),
            client_draft: StagingBuffer::new(),
            project_draft: StagingBuffer::new(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.gate.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    pub fn clients(&self) -> &[Client] {
        self.clients.items()
    }

    pub fn projects(&self) -> &[PortfolioItem] {
        self.projects.items()
    }

    pub fn client_draft(&self) -> &StagingBuffer<ClientDraft> {
        &self.client_draft
    }

    pub fn client_draft_mut(&mut self) -> &mut StagingBuffer<ClientDraft> {
        &mut self.client_draft
    }

    pub fn project_draft(&self) -> &StagingBuffer<PortfolioDraft> {
        &self.project_draft
    }

    pub fn project_draft_mut(&mut self) -> &mut StagingBuffer<PortfolioDraft> {
        &mut self.project_draft
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn token_store(&self) -> &S {
        &self.tokens
    }

    /// ログイン
    ///
    /// 未認証から認証済みに入った場合のみ両ミラーを再取得し、その結果を返す。
    /// 認証済みのまま再ログインした場合はトークンを更新するだけで `None`。
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Option<RefreshReport>> {
        let request = credentials(username, password)?;

        let token = self.api.login(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "login rejected");
            AdminError::Auth(e)
        })?;

        self.tokens.save(&token)?;
        tracing::info!(username = %request.username, "logged in");

        if self.gate.open() {
            Ok(Some(self.refresh_both(&token).await))
        } else {
            Ok(None)
        }
    }

    /// 保存済みトークンでセッションを再開
    pub async fn resume(&mut self) -> Result<Option<RefreshReport>> {
        let token = self.tokens.load()?.ok_or(AdminError::NotAuthenticated)?;

        if self.gate.open() {
            tracing::info!("session resumed from stored token");
            Ok(Some(self.refresh_both(&token).await))
        } else {
            Ok(None)
        }
    }

    /// 両ミラーを再取得（認証済みのみ）
    pub async fn refresh_all(&mut self) -> Result<RefreshReport> {
        let token = self.authorized_token()?;
        Ok(self.refresh_both(&token).await)
    }

    pub async fn refresh_clients(&mut self) -> Result<usize> {
        let token = self.authorized_token()?;
        let result =
            refresh_mirror(&mut self.clients, Collection::Clients, self.api.list_clients(&token)).await;
        self.observe(result)
    }

    pub async fn refresh_projects(&mut self) -> Result<usize> {
        let token = self.authorized_token()?;
        let result =
            refresh_mirror(&mut self.projects, Collection::Projects, self.api.list_projects(&token)).await;
        self.observe(result)
    }

    /// 入力中のクライアントを送信
    pub async fn add_client(&mut self) -> Result<AddOutcome<Client>> {
        let token = self.authorized_token()?;
        let form = self.client_draft.submission()?;

        let created = self
            .api
            .add_client(&token, &form)
            .await
            .map_err(|source| write_failed(ADD_CLIENT, source));
        let created = self.observe(created)?;
        self.client_draft.clear();

        match created {
            Created::Entity(client) => {
                tracing::info!(id = %client.id, "client added");
                self.clients.append(client.clone());
                Ok(AddOutcome::Appended(client))
            }
            Created::Acknowledged => {
                tracing::info!("client add acknowledged, refreshing");
                Ok(AddOutcome::Refreshed(self.refresh_clients().await))
            }
        }
    }

    /// 入力中の作品を送信
    pub async fn add_project(&mut self) -> Result<AddOutcome<PortfolioItem>> {
        let token = self.authorized_token()?;
        let form = self.project_draft.submission()?;

        let created = self
            .api
            .add_project(&token, &form)
            .await
            .map_err(|source| write_failed(ADD_PROJECT, source));
        let created = self.observe(created)?;
        self.project_draft.clear();

        match created {
            Created::Entity(item) => {
                tracing::info!(id = %item.id, "portfolio item added");
                self.projects.append(item.clone());
                Ok(AddOutcome::Appended(item))
            }
            Created::Acknowledged => {
                tracing::info!("portfolio item add acknowledged, refreshing");
                Ok(AddOutcome::Refreshed(self.refresh_projects().await))
            }
        }
    }

    pub async fn remove_client(&mut self, id: &str, confirm: &dyn Confirm) -> Result<RemoveOutcome> {
        let token = self.authorized_token()?;
        if !confirm.confirm("Are you sure you want to delete this client?")? {
            return Ok(RemoveOutcome::Declined);
        }

        let deleted = self
            .api
            .delete_client(&token, id)
            .await
            .map_err(|source| write_failed(DELETE_CLIENT, source));
        self.observe(deleted)?;
        Ok(settle_removal(&mut self.clients, id))
    }

    pub async fn remove_project(&mut self, id: &str, confirm: &dyn Confirm) -> Result<RemoveOutcome> {
        let token = self.authorized_token()?;
        if !confirm.confirm("Are you sure you want to delete this Portfolio Item?")? {
            return Ok(RemoveOutcome::Declined);
        }

        let deleted = self
            .api
            .delete_project(&token, id)
            .await
            .map_err(|source| write_failed(DELETE_PROJECT, source));
        self.observe(deleted)?;
        Ok(settle_removal(&mut self.projects, id))
    }

    fn authorized_token(&self) -> Result<SessionToken> {
        if !self.gate.is_authenticated() {
            return Err(AdminError::NotAuthenticated);
        }
        self.tokens.load()?.ok_or(AdminError::NotAuthenticated)
    }

    /// トークンが拒否されていればセッションを閉じる
    fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if matches!(result, Err(AdminError::Auth(_))) {
            tracing::warn!("session token rejected, closing session");
            self.gate.close();
        }
        result
    }

    // 2つのミラーは別フィールドなので同時に借用して並行実行できる
    async fn refresh_both(&mut self, token: &SessionToken) -> RefreshReport {
        let api = &self.api;
        let (clients, projects) = futures::join!(
            refresh_mirror(&mut self.clients, Collection::Clients, api.list_clients(token)),
            refresh_mirror(&mut self.projects, Collection::Projects, api.list_projects(token)),
        );
        let report = RefreshReport { clients, projects };
        if report.errors().any(|e| matches!(e, AdminError::Auth(_))) {
            tracing::warn!("session token rejected, closing session");
            self.gate.close();
        }
        report
    }
}

/// 取得成功時のみ全件置換。失敗時は既存の内容を残す
async fn refresh_mirror<T, F>(
    mirror: &mut CollectionMirror<T>,
    collection: Collection,
    fetch: F,
) -> Result<usize>
where
    T: Entity,
    F: Future<Output = RemoteResult<Vec<T>>>,
{
    match fetch.await {
        Ok(items) => {
            mirror.replace(items);
            tracing::info!(%collection, count = mirror.len(), "mirror refreshed");
            Ok(mirror.len())
        }
        Err(source) => {
            tracing::warn!(%collection, error = %source, "mirror refresh failed");
            if source.is_unauthorized() {
                Err(AdminError::Auth(source))
            } else {
                Err(AdminError::Fetch { collection, source })
            }
        }
    }
}

fn settle_removal<T: Entity>(mirror: &mut CollectionMirror<T>, id: &str) -> RemoveOutcome {
    if mirror.remove(id) > 0 {
        tracing::info!(%id, "entity removed");
        RemoveOutcome::Removed
    } else {
        tracing::debug!(%id, "deleted id was not in the local mirror");
        RemoveOutcome::NotPresent
    }
}

fn write_failed(action: &'static str, source: RemoteError) -> AdminError {
    tracing::warn!(action, error = %source, "write failed");
    if source.is_unauthorized() {
        AdminError::Auth(source)
    } else {
        AdminError::Write { action, source }
    }
}
