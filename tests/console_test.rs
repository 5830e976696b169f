//! 同期コントローラのテスト
//!
//! インメモリのフェイクAPIで、ログインゲート・再取得・追加・削除の
//! 状態遷移を検証する

use async_trait::async_trait;
use portfolio_admin::console::{AddOutcome, Console, RemoveOutcome};
use portfolio_admin::credential::{MemoryTokenStore, TokenStore};
use portfolio_admin::error::AdminError;
use portfolio_admin::remote::{Collection, Created, PortfolioApi, RemoteError, RemoteResult};
use portfolio_admin_common::{
    AuthState, Client, ClientField, ClientForm, LoginRequest, PortfolioField, PortfolioForm,
    PortfolioItem, SessionToken, UploadFile,
};
use std::sync::Mutex;

#[derive(Default)]
struct ServerState {
    /// ログイン成功時に返すトークン（Noneなら拒否）
    token: Option<String>,
    clients: Vec<Client>,
    projects: Vec<PortfolioItem>,
    next_id: usize,

    fail_clients_list: bool,
    fail_projects_list: bool,
    fail_writes: bool,
    ack_only: bool,
    /// 認証付き呼び出しを401で拒否（トークン期限切れ）
    reject_token: bool,

    login_calls: usize,
    list_clients_calls: usize,
    list_projects_calls: usize,
    add_calls: usize,
    delete_calls: usize,
    seen_tokens: Vec<String>,
}

#[derive(Default)]
struct FakeApi {
    state: Mutex<ServerState>,
}

impl FakeApi {
    fn with(configure: impl FnOnce(&mut ServerState)) -> Self {
        let api = FakeApi::default();
        configure(&mut api.state.lock().unwrap());
        api
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }
}

fn connection_refused() -> RemoteError {
    RemoteError::Unreachable("connection refused".into())
}

fn token_expired() -> RemoteError {
    RemoteError::Rejected {
        status: 401,
        message: "jwt expired".into(),
    }
}

#[async_trait]
impl PortfolioApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> RemoteResult<SessionToken> {
        let mut state = self.state();
        state.login_calls += 1;
        match (&state.token, request.password.as_str()) {
            (Some(token), "secret") => Ok(SessionToken::new(token.clone())),
            _ => Err(RemoteError::Rejected {
                status: 401,
                message: "Invalid credentials".into(),
            }),
        }
    }

    async fn list_clients(&self, token: &SessionToken) -> RemoteResult<Vec<Client>> {
        let mut state = self.state();
        state.list_clients_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_clients_list {
            return Err(connection_refused());
        }
        Ok(state.clients.clone())
    }

    async fn list_projects(&self, token: &SessionToken) -> RemoteResult<Vec<PortfolioItem>> {
        let mut state = self.state();
        state.list_projects_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_projects_list {
            return Err(connection_refused());
        }
        Ok(state.projects.clone())
    }

    async fn add_client(&self, token: &SessionToken, form: &ClientForm) -> RemoteResult<Created<Client>> {
        let mut state = self.state();
        state.add_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_writes {
            return Err(RemoteError::Rejected {
                status: 500,
                message: "upload failed".into(),
            });
        }

        let id = state.next_id.to_string();
        state.next_id += 1;
        let client = Client {
            image: format!("u{}", id),
            id,
            name: form.name.clone(),
        };
        state.clients.push(client.clone());

        if state.ack_only {
            Ok(Created::Acknowledged)
        } else {
            Ok(Created::Entity(client))
        }
    }

    async fn add_project(
        &self,
        token: &SessionToken,
        form: &PortfolioForm,
    ) -> RemoteResult<Created<PortfolioItem>> {
        let mut state = self.state();
        state.add_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_writes {
            return Err(connection_refused());
        }

        let id = state.next_id.to_string();
        state.next_id += 1;
        let item = PortfolioItem {
            image: format!("p{}", id),
            id,
            title: form.title.clone(),
            category: form.category.clone(),
            kind: form.kind.clone(),
            orientation: form.orientation.clone(),
            video: form.video.clone(),
        };
        state.projects.push(item.clone());

        if state.ack_only {
            Ok(Created::Acknowledged)
        } else {
            Ok(Created::Entity(item))
        }
    }

    async fn delete_client(&self, token: &SessionToken, id: &str) -> RemoteResult<()> {
        let mut state = self.state();
        state.delete_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_writes {
            return Err(connection_refused());
        }
        state.clients.retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_project(&self, token: &SessionToken, id: &str) -> RemoteResult<()> {
        let mut state = self.state();
        state.delete_calls += 1;
        state.seen_tokens.push(token.as_str().to_string());
        if state.reject_token {
            return Err(token_expired());
        }
        if state.fail_writes {
            return Err(connection_refused());
        }
        state.projects.retain(|p| p.id != id);
        Ok(())
    }
}

fn client(id: &str, name: &str) -> Client {
    Client {
        id: id.into(),
        name: name.into(),
        image: format!("u{}", id),
    }
}

fn project(id: &str, title: &str) -> PortfolioItem {
    PortfolioItem {
        id: id.into(),
        title: title.into(),
        ..Default::default()
    }
}

fn logo() -> UploadFile {
    UploadFile::new("logo.png", vec![0x89, 0x50, 0x4e, 0x47])
}

fn seeded_api() -> FakeApi {
    FakeApi::with(|s| {
        s.token = Some("abc123".into());
        s.clients = vec![client("1", "Acme")];
        s.projects = vec![project("p1", "Showreel")];
        s.next_id = 2;
    })
}

async fn logged_in(api: FakeApi) -> Console<FakeApi, MemoryTokenStore> {
    let mut console = Console::new(api, MemoryTokenStore::new());
    console.login("admin", "secret").await.expect("ログイン失敗");
    console
}

/// ログイン → 再取得 → 追加 → 削除の一連の流れ
#[tokio::test]
async fn test_login_add_remove_scenario() {
    let mut console = Console::new(seeded_api(), MemoryTokenStore::new());
    assert_eq!(console.state(), AuthState::Unauthenticated);

    let report = console
        .login("admin", "secret")
        .await
        .expect("ログイン失敗")
        .expect("再取得が実行されていない");
    assert!(report.is_complete());
    assert_eq!(console.state(), AuthState::Authenticated);
    assert_eq!(console.clients(), &[client("1", "Acme")]);

    console.client_draft_mut().set(ClientField::Name, "Globex");
    console.client_draft_mut().set_image(logo());
    let outcome = console.add_client().await.expect("追加失敗");
    assert!(matches!(outcome, AddOutcome::Appended(ref c) if *c == client("2", "Globex")));
    assert_eq!(console.clients(), &[client("1", "Acme"), client("2", "Globex")]);

    let outcome = console.remove_client("1", &true).await.expect("削除失敗");
    assert_eq!(outcome, RemoveOutcome::Removed);
    assert_eq!(console.clients(), &[client("2", "Globex")]);

    // 認証付き呼び出しはすべて保存済みトークンを使う
    let state = console.api().state();
    assert!(state.seen_tokens.iter().all(|t| t == "abc123"));
}

#[tokio::test]
async fn test_login_stores_token() {
    let console = logged_in(seeded_api()).await;
    assert_eq!(
        console.token_store().load().unwrap(),
        Some(SessionToken::new("abc123"))
    );
}

/// 空の入力では通信しない
#[tokio::test]
async fn test_empty_credentials_never_call_service() {
    let mut console = Console::new(seeded_api(), MemoryTokenStore::new());

    for (user, pass) in [("", "secret"), ("admin", ""), ("", "")] {
        let err = console.login(user, pass).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert!(err.is_local());
    }

    assert_eq!(console.state(), AuthState::Unauthenticated);
    assert_eq!(console.api().state().login_calls, 0);
}

#[tokio::test]
async fn test_rejected_login_stays_unauthenticated() {
    let mut console = Console::new(seeded_api(), MemoryTokenStore::new());

    let err = console.login("admin", "wrong").await.unwrap_err();
    match err {
        AdminError::Auth(source) => assert!(source.is_unauthorized()),
        other => panic!("unexpected: {:?}", other),
    }

    assert_eq!(console.state(), AuthState::Unauthenticated);
    let state = console.api().state();
    assert_eq!(state.login_calls, 1);
    assert_eq!(state.list_clients_calls, 0);
    assert_eq!(state.list_projects_calls, 0);
}

/// 認証済みへの遷移で各ミラーがちょうど1回ずつ再取得される
#[tokio::test]
async fn test_entering_session_refreshes_each_mirror_once() {
    let mut console = logged_in(seeded_api()).await;
    {
        let state = console.api().state();
        assert_eq!(state.list_clients_calls, 1);
        assert_eq!(state.list_projects_calls, 1);
    }

    // 認証済みのまま再ログインしても遷移ではないので再取得しない
    let report = console.login("admin", "secret").await.expect("ログイン失敗");
    assert!(report.is_none());
    let state = console.api().state();
    assert_eq!(state.list_clients_calls, 1);
    assert_eq!(state.list_projects_calls, 1);
}

/// 片方の取得失敗はもう片方に影響しない
#[tokio::test]
async fn test_refreshes_are_independent() {
    let api = FakeApi::with(|s| {
        s.token = Some("abc123".into());
        s.clients = vec![client("1", "Acme")];
        s.projects = vec![project("p1", "Showreel")];
        s.fail_clients_list = true;
    });
    let mut console = Console::new(api, MemoryTokenStore::new());

    let report = console.login("admin", "secret").await.unwrap().unwrap();
    assert!(matches!(
        report.clients,
        Err(AdminError::Fetch {
            collection: Collection::Clients,
            ..
        })
    ));
    assert_eq!(report.projects.as_ref().ok(), Some(&1));
    assert_eq!(report.errors().count(), 1);

    assert!(console.is_authenticated());
    assert!(console.clients().is_empty());
    assert_eq!(console.projects(), &[project("p1", "Showreel")]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let mut console = logged_in(seeded_api()).await;
    let before = console.clients().to_vec();

    {
        let mut state = console.api().state();
        state.clients.push(client("9", "Hooli"));
        state.fail_clients_list = true;
    }

    let err = console.refresh_clients().await.unwrap_err();
    assert!(matches!(err, AdminError::Fetch { .. }));
    assert_eq!(console.clients(), before.as_slice());
}

#[tokio::test]
async fn test_refresh_replaces_whole_collection() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().clients = vec![client("7", "Umbrella"), client("8", "Soylent")];

    let count = console.refresh_clients().await.expect("再取得失敗");
    assert_eq!(count, 2);
    assert_eq!(console.clients(), &[client("7", "Umbrella"), client("8", "Soylent")]);
}

/// 必須項目が欠けていれば通信しない
#[tokio::test]
async fn test_add_without_image_is_rejected_locally() {
    let mut console = logged_in(seeded_api()).await;
    console.client_draft_mut().set(ClientField::Name, "Globex");

    let err = console.add_client().await.unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(console.api().state().add_calls, 0);
    assert_eq!(console.clients().len(), 1);
    assert_eq!(console.client_draft().draft().name, "Globex");
}

#[tokio::test]
async fn test_failed_add_keeps_mirror_and_draft() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().fail_writes = true;

    console.client_draft_mut().set(ClientField::Name, "Globex");
    console.client_draft_mut().set_image(logo());
    let before = console.clients().to_vec();

    let err = console.add_client().await.unwrap_err();
    assert!(matches!(err, AdminError::Write { .. }));
    assert_eq!(console.clients(), before.as_slice());

    // 入力は残っているので再送できる
    let draft = console.client_draft().draft();
    assert_eq!(draft.name, "Globex");
    assert!(draft.image.is_some());

    console.api().state().fail_writes = false;
    console.add_client().await.expect("再送失敗");
    assert_eq!(console.clients().len(), before.len() + 1);
    assert!(console.client_draft().draft().name.is_empty());
}

/// 受理応答のみの場合は一覧を再取得する
#[tokio::test]
async fn test_acknowledged_add_refreshes_mirror() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().ack_only = true;

    console.client_draft_mut().set(ClientField::Name, "Globex");
    console.client_draft_mut().set_image(logo());

    let outcome = console.add_client().await.expect("追加失敗");
    assert!(matches!(outcome, AddOutcome::Refreshed(Ok(2))));
    assert_eq!(console.clients(), &[client("1", "Acme"), client("2", "Globex")]);
    assert!(console.client_draft().draft().image.is_none());
    assert_eq!(console.api().state().list_clients_calls, 2);
}

#[tokio::test]
async fn test_add_project_appends_server_entity() {
    let mut console = logged_in(seeded_api()).await;

    let draft = console.project_draft_mut();
    draft.set(PortfolioField::Title, "Launch film");
    draft.set(PortfolioField::Category, "ads");
    draft.set(PortfolioField::Kind, "video");
    draft.set(PortfolioField::Orientation, "Landscape");
    draft.set(PortfolioField::Video, "https://youtu.be/launch");
    draft.set_image(logo());

    let outcome = console.add_project().await.expect("追加失敗");
    let AddOutcome::Appended(item) = outcome else {
        panic!("entity expected");
    };
    assert_eq!(item.id, "2");
    assert_eq!(item.kind, "video");
    assert_eq!(console.projects().len(), 2);
    assert_eq!(console.projects()[1], item);
    assert!(console.project_draft().draft().title.is_empty());
}

#[tokio::test]
async fn test_declined_remove_makes_no_call() {
    let mut console = logged_in(seeded_api()).await;

    let outcome = console.remove_client("1", &false).await.expect("削除失敗");
    assert_eq!(outcome, RemoveOutcome::Declined);
    assert_eq!(console.api().state().delete_calls, 0);
    assert_eq!(console.clients(), &[client("1", "Acme")]);
}

#[tokio::test]
async fn test_remove_missing_id_leaves_mirror_unchanged() {
    let mut console = logged_in(seeded_api()).await;

    let outcome = console.remove_project("nope", &true).await.expect("削除失敗");
    assert_eq!(outcome, RemoveOutcome::NotPresent);
    assert_eq!(console.projects(), &[project("p1", "Showreel")]);
}

#[tokio::test]
async fn test_remove_keeps_relative_order() {
    let api = FakeApi::with(|s| {
        s.token = Some("abc123".into());
        s.clients = vec![client("1", "Acme"), client("2", "Globex"), client("3", "Initech")];
    });
    let mut console = logged_in(api).await;

    console.remove_client("2", &true).await.expect("削除失敗");
    assert_eq!(console.clients(), &[client("1", "Acme"), client("3", "Initech")]);
}

#[tokio::test]
async fn test_failed_remove_keeps_mirror() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().fail_writes = true;

    let err = console.remove_client("1", &true).await.unwrap_err();
    assert!(matches!(err, AdminError::Write { .. }));
    assert_eq!(console.clients(), &[client("1", "Acme")]);
}

/// 未認証ではどの操作も通信しない
#[tokio::test]
async fn test_operations_require_session() {
    let mut console = Console::new(seeded_api(), MemoryTokenStore::new());
    console.client_draft_mut().set(ClientField::Name, "Globex");
    console.client_draft_mut().set_image(logo());

    assert!(matches!(console.refresh_clients().await, Err(AdminError::NotAuthenticated)));
    assert!(matches!(console.refresh_all().await, Err(AdminError::NotAuthenticated)));
    assert!(matches!(console.add_client().await, Err(AdminError::NotAuthenticated)));
    assert!(matches!(
        console.remove_project("p1", &true).await,
        Err(AdminError::NotAuthenticated)
    ));

    let state = console.api().state();
    assert_eq!(state.list_clients_calls, 0);
    assert_eq!(state.add_calls, 0);
    assert_eq!(state.delete_calls, 0);
}

#[tokio::test]
async fn test_resume_with_stored_token() {
    let store = MemoryTokenStore::with_token(SessionToken::new("stored"));
    let mut console = Console::new(seeded_api(), store);

    let report = console.resume().await.expect("再開失敗").expect("再取得なし");
    assert!(report.is_complete());
    assert!(console.is_authenticated());
    assert_eq!(console.clients().len(), 1);

    let state = console.api().state();
    assert_eq!(state.login_calls, 0);
    assert!(state.seen_tokens.iter().all(|t| t == "stored"));
}

#[tokio::test]
async fn test_resume_without_token() {
    let mut console = Console::new(seeded_api(), MemoryTokenStore::new());
    assert!(matches!(console.resume().await, Err(AdminError::NotAuthenticated)));
    assert_eq!(console.state(), AuthState::Unauthenticated);
}

/// 受理後の再取得に失敗しても追加自体は成功として返す
#[tokio::test]
async fn test_acknowledged_add_with_failed_refresh() {
    let mut console = logged_in(seeded_api()).await;
    {
        let mut state = console.api().state();
        state.ack_only = true;
        state.fail_clients_list = true;
    }

    console.client_draft_mut().set(ClientField::Name, "Globex");
    console.client_draft_mut().set_image(logo());

    let outcome = console.add_client().await.expect("追加は成功しているはず");
    assert!(matches!(
        outcome,
        AddOutcome::Refreshed(Err(AdminError::Fetch {
            collection: Collection::Clients,
            ..
        }))
    ));
    assert!(console.client_draft().draft().name.is_empty());
    assert_eq!(console.clients(), &[client("1", "Acme")]);
    assert_eq!(console.api().state().add_calls, 1);
}

#[tokio::test]
async fn test_failed_add_project_keeps_mirror_and_draft() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().fail_writes = true;

    let draft = console.project_draft_mut();
    draft.set(PortfolioField::Title, "Launch film");
    draft.set(PortfolioField::Category, "ads");
    draft.set(PortfolioField::Kind, "video");
    draft.set(PortfolioField::Orientation, "Landscape");
    draft.set_image(logo());

    let err = console.add_project().await.unwrap_err();
    assert!(matches!(err, AdminError::Write { .. }));
    assert_eq!(console.projects(), &[project("p1", "Showreel")]);

    let draft = console.project_draft().draft();
    assert_eq!(draft.title, "Launch film");
    assert_eq!(draft.kind, "video");
    assert!(draft.image.is_some());
}

#[tokio::test]
async fn test_failed_remove_project_keeps_mirror() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().fail_writes = true;

    let err = console.remove_project("p1", &true).await.unwrap_err();
    assert!(matches!(err, AdminError::Write { .. }));
    assert_eq!(console.projects(), &[project("p1", "Showreel")]);
    assert_eq!(console.api().state().delete_calls, 1);
}

/// 保存済みトークンが拒否されたら認証エラーとして未認証に戻る
#[tokio::test]
async fn test_resume_with_expired_token() {
    let api = FakeApi::with(|s| {
        s.clients = vec![client("1", "Acme")];
        s.reject_token = true;
    });
    let store = MemoryTokenStore::with_token(SessionToken::new("stale"));
    let mut console = Console::new(api, store);

    let report = console.resume().await.expect("再開失敗").expect("再取得なし");
    assert!(matches!(report.clients, Err(AdminError::Auth(_))));
    assert!(matches!(report.projects, Err(AdminError::Auth(_))));
    assert_eq!(console.state(), AuthState::Unauthenticated);
    assert!(console.clients().is_empty());

    // 以降の操作は通信せずに弾かれる
    assert!(matches!(console.refresh_clients().await, Err(AdminError::NotAuthenticated)));
    assert_eq!(console.api().state().list_clients_calls, 1);
}

#[tokio::test]
async fn test_write_with_expired_token_closes_session() {
    let mut console = logged_in(seeded_api()).await;
    console.api().state().reject_token = true;

    let err = console.remove_client("1", &true).await.unwrap_err();
    match err {
        AdminError::Auth(source) => assert!(source.is_unauthorized()),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(console.state(), AuthState::Unauthenticated);
    assert_eq!(console.clients(), &[client("1", "Acme")]);

    // 再ログインで再び遷移扱いとなり、両ミラーを再取得する
    console.api().state().reject_token = false;
    let report = console.login("admin", "secret").await.unwrap();
    assert!(report.is_some());
    assert!(console.is_authenticated());
}
