//! 対話式コンソール
//!
//! 1つのコントローラをセッション全体で使い回し、メニューから
//! ログイン・一覧表示・下書き編集・送信・削除を行う。
//! 各操作のエラーは表示して続行する（プロンプト自体の失敗のみ終了）。

use crate::console::{AddOutcome, Confirm, Console, RefreshReport, RemoveOutcome};
use crate::credential::TokenStore;
use crate::error::{AdminError, Result};
use crate::remote::PortfolioApi;
use dialoguer::{Confirm as ConfirmPrompt, Input, Password, Select};
use indicatif::ProgressBar;
use portfolio_admin_common::{
    Client, ClientField, Draft, PortfolioField, PortfolioItem, StagingBuffer, UploadFile,
};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// 端末で確認を取る
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(ConfirmPrompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}

/// 通信中はスピナーを表示
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Login,
    ListClients,
    AddClient,
    DeleteClient,
    ListProjects,
    AddProject,
    DeleteProject,
    Refresh,
    Quit,
}

impl MenuAction {
    /// 認証状態に応じて操作可能な項目
    pub fn available(authenticated: bool) -> Vec<MenuAction> {
        if authenticated {
            vec![
                MenuAction::ListClients,
                MenuAction::AddClient,
                MenuAction::DeleteClient,
                MenuAction::ListProjects,
                MenuAction::AddProject,
                MenuAction::DeleteProject,
                MenuAction::Refresh,
                MenuAction::Quit,
            ]
        } else {
            vec![MenuAction::Login, MenuAction::Quit]
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Login => "ログイン",
            MenuAction::ListClients => "クライアント一覧",
            MenuAction::AddClient => "クライアントを追加",
            MenuAction::DeleteClient => "クライアントを削除",
            MenuAction::ListProjects => "ポートフォリオ一覧",
            MenuAction::AddProject => "ポートフォリオ作品を追加",
            MenuAction::DeleteProject => "ポートフォリオ作品を削除",
            MenuAction::Refresh => "再読み込み",
            MenuAction::Quit => "終了",
        }
    }
}

pub async fn run_console<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    println!("🗂  portfolio-admin - 管理コンソール\n");

    loop {
        let actions = MenuAction::available(console.is_authenticated());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let selected = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        let outcome = match actions[selected] {
            MenuAction::Quit => break,
            MenuAction::Login => login(console).await,
            MenuAction::ListClients => {
                print_clients(console.clients());
                Ok(())
            }
            MenuAction::ListProjects => {
                print_projects(console.projects());
                Ok(())
            }
            MenuAction::AddClient => add_client(console).await,
            MenuAction::AddProject => add_project(console).await,
            MenuAction::DeleteClient => delete_client(console).await,
            MenuAction::DeleteProject => delete_project(console).await,
            MenuAction::Refresh => with_spinner("読み込み中...", console.refresh_all())
                .await
                .map(|report| print_refresh_report(&report)),
        };

        match outcome {
            Ok(()) => {}
            Err(e @ AdminError::Prompt(_)) => return Err(e),
            // 送信前に弾かれたものは入力し直せばよい
            Err(e) if e.is_local() => println!("⚠ {}\n", e),
            Err(e @ AdminError::Auth(_)) => {
                println!("❌ {}", e);
                println!("もう一度ログインしてください\n");
            }
            Err(e) => println!("❌ {}\n", e),
        }
    }

    println!("終了します");
    Ok(())
}

async fn login<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Username")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?;

    let report = with_spinner("ログイン中...", console.login(&username, &password)).await?;
    println!("✔ ログインしました");
    if let Some(report) = report {
        print_refresh_report(&report);
    }
    Ok(())
}

async fn add_client<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    edit_draft(console.client_draft_mut(), &ClientField::ALL, |f| f.label())?;
    let outcome = with_spinner("送信中...", console.add_client()).await?;
    print_add_outcome(&outcome, |c: &Client| c.name.clone());
    Ok(())
}

async fn add_project<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    edit_draft(console.project_draft_mut(), &PortfolioField::ALL, |f| f.label())?;
    let outcome = with_spinner("送信中...", console.add_project()).await?;
    print_add_outcome(&outcome, |p: &PortfolioItem| p.title.clone());
    Ok(())
}

async fn delete_client<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    let labels: Vec<String> = console.clients().iter().map(|c| c.name.clone()).collect();
    let Some(idx) = pick("削除するクライアント", &labels)? else {
        return Ok(());
    };
    let id = console.clients()[idx].id.clone();

    let outcome = console.remove_client(&id, &PromptConfirm).await?;
    print_remove_outcome(outcome);
    Ok(())
}

async fn delete_project<A: PortfolioApi, S: TokenStore>(console: &mut Console<A, S>) -> Result<()> {
    let labels: Vec<String> = console.projects().iter().map(|p| p.title.clone()).collect();
    let Some(idx) = pick("削除する作品", &labels)? else {
        return Ok(());
    };
    let id = console.projects()[idx].id.clone();

    let outcome = console.remove_project(&id, &PromptConfirm).await?;
    print_remove_outcome(outcome);
    Ok(())
}

/// 下書きを項目ごとに編集（現在値を初期値として表示）
fn edit_draft<D: Draft>(
    buffer: &mut StagingBuffer<D>,
    fields: &[D::Field],
    label: impl Fn(&D::Field) -> &'static str,
) -> Result<()> {
    for field in fields {
        let current = buffer.draft().field(*field).to_string();
        let value: String = Input::new()
            .with_prompt(label(field))
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        buffer.set(*field, value);
    }

    let prompt = match buffer.draft().image() {
        Some(file) => format!("画像ファイル（空欄で {} のまま）", file.file_name),
        None => "画像ファイルのパス".to_string(),
    };
    let path: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if !path.trim().is_empty() {
        buffer.set_image(UploadFile::from_path(Path::new(path.trim()))?);
    }
    Ok(())
}

fn pick(prompt: &str, labels: &[String]) -> Result<Option<usize>> {
    if labels.is_empty() {
        println!("対象がありません\n");
        return Ok(None);
    }

    let mut items: Vec<&str> = labels.iter().map(String::as_str).collect();
    items.push("キャンセル");

    let selected = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok((selected < labels.len()).then_some(selected))
}

pub fn print_refresh_report(report: &RefreshReport) {
    match &report.clients {
        Ok(count) => println!("✔ クライアント: {}件", count),
        Err(e) => println!("❌ {}", e),
    }
    match &report.projects {
        Ok(count) => println!("✔ ポートフォリオ作品: {}件", count),
        Err(e) => println!("❌ {}", e),
    }
    println!();
}

/// 再開時の再取得結果を確認
///
/// 一覧表示（`required`）では失敗をそのまま返す。空の一覧を表示しないため。
/// 追加・削除の前なら警告のみで続行するが、トークン拒否は中断する。
pub fn check_refresh(refreshed: Option<Result<usize>>, required: bool) -> Result<()> {
    match refreshed {
        Some(Err(e)) if required || matches!(e, AdminError::Auth(_)) => Err(e),
        Some(Err(e)) => {
            println!("⚠ {}", e);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn print_clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("クライアントはありません\n");
        return;
    }
    println!("クライアント ({}件):", clients.len());
    for client in clients {
        println!("  [{}] {}", client.id, client.name);
        println!("      画像: {}", client.image);
    }
    println!();
}

pub fn print_projects(items: &[PortfolioItem]) {
    if items.is_empty() {
        println!("ポートフォリオ作品はありません\n");
        return;
    }
    println!("ポートフォリオ作品 ({}件):", items.len());
    for item in items {
        println!("  [{}] {}", item.id, item.title);
        println!(
            "      カテゴリ: {} / タイプ: {} / 向き: {}",
            item.category, item.kind, item.orientation
        );
        if !item.video.is_empty() {
            println!("      動画: {}", item.video);
        }
        println!("      画像: {}", item.image);
    }
    println!();
}

pub fn print_add_outcome<T>(outcome: &AddOutcome<T>, describe: impl Fn(&T) -> String) {
    match outcome {
        AddOutcome::Appended(entity) => println!("✔ 追加しました: {}\n", describe(entity)),
        AddOutcome::Refreshed(Ok(count)) => {
            println!("✔ 追加しました（一覧を再取得: {}件）\n", count)
        }
        AddOutcome::Refreshed(Err(e)) => {
            println!("✔ 追加しました");
            println!("❌ {}\n", e);
        }
    }
}

pub fn print_remove_outcome(outcome: RemoveOutcome) {
    match outcome {
        RemoveOutcome::Declined => println!("削除を中止しました\n"),
        RemoveOutcome::Removed => println!("✔ 削除しました\n"),
        RemoveOutcome::NotPresent => println!("✔ 削除しました（一覧に該当なし）\n"),
    }
}
