use clap::Parser;
use portfolio_admin::{cli, config, console, credential, error, interactive, remote};
use cli::{ClientCommand, Cli, Commands, ProjectCommand};
use config::Config;
use console::{Confirm, Console, RefreshReport};
use credential::{FileTokenStore, TokenStore};
use error::Result;
use interactive::{with_spinner, PromptConfirm};
use portfolio_admin_common::{Client, ClientField, PortfolioField, PortfolioItem, UploadFile};
use remote::{HttpApi, PortfolioApi};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;
    let base_url = config.resolve_base_url(cli.base_url.as_deref());

    match cli.command {
        Commands::Config { set_base_url, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ ベースURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ベースURL: {}", base_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }

        command => {
            tracing::debug!(%base_url, "using service");
            let api = HttpApi::new(&base_url, Duration::from_secs(config.timeout_seconds))?;
            let mut console = Console::new(api, FileTokenStore::open_default()?);
            run_command(command, &mut console).await?;
        }
    }

    Ok(())
}

async fn run_command<A: PortfolioApi, S: TokenStore>(
    command: Commands,
    console: &mut Console<A, S>,
) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => dialoguer::Input::<String>::new()
                    .with_prompt("Username")
                    .allow_empty(true)
                    .interact_text()?,
            };
            let password = match password {
                Some(p) => p,
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()?,
            };

            let report = with_spinner("ログイン中...", console.login(&username, &password)).await?;
            if let Some(report) = report {
                interactive::print_refresh_report(&report);
            }
            println!("✅ ログインしました");
        }

        Commands::Clients { action } => {
            let refreshed = resume_session(console).await?.map(|report| report.clients);

            match action {
                ClientCommand::List => {
                    interactive::check_refresh(refreshed, true)?;
                    interactive::print_clients(console.clients());
                }
                ClientCommand::Add { name, image } => {
                    interactive::check_refresh(refreshed, false)?;
                    let draft = console.client_draft_mut();
                    draft.set(ClientField::Name, name);
                    draft.set_image(UploadFile::from_path(&image)?);

                    let outcome = with_spinner("送信中...", console.add_client()).await?;
                    interactive::print_add_outcome(&outcome, |c: &Client| c.name.clone());
                }
                ClientCommand::Delete { id, yes } => {
                    interactive::check_refresh(refreshed, false)?;
                    let confirm: &dyn Confirm = if yes { &true } else { &PromptConfirm };
                    let outcome = console.remove_client(&id, confirm).await?;
                    interactive::print_remove_outcome(outcome);
                }
            }
        }

        Commands::Projects { action } => {
            let refreshed = resume_session(console).await?.map(|report| report.projects);

            match action {
                ProjectCommand::List => {
                    interactive::check_refresh(refreshed, true)?;
                    interactive::print_projects(console.projects());
                }
                ProjectCommand::Add { title, category, kind, orientation, video, image } => {
                    interactive::check_refresh(refreshed, false)?;
                    let draft = console.project_draft_mut();
                    draft.set(PortfolioField::Title, title);
                    draft.set(PortfolioField::Category, category);
                    draft.set(PortfolioField::Kind, kind);
                    draft.set(PortfolioField::Orientation, orientation);
                    draft.set(PortfolioField::Video, video);
                    draft.set_image(UploadFile::from_path(&image)?);

                    let outcome = with_spinner("送信中...", console.add_project()).await?;
                    interactive::print_add_outcome(&outcome, |p: &PortfolioItem| p.title.clone());
                }
                ProjectCommand::Delete { id, yes } => {
                    interactive::check_refresh(refreshed, false)?;
                    let confirm: &dyn Confirm = if yes { &true } else { &PromptConfirm };
                    let outcome = console.remove_project(&id, confirm).await?;
                    interactive::print_remove_outcome(outcome);
                }
            }
        }

        Commands::Console => interactive::run_console(console).await?,

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// 保存済みトークンでセッションを再開
async fn resume_session<A: PortfolioApi, S: TokenStore>(
    console: &mut Console<A, S>,
) -> Result<Option<RefreshReport>> {
    with_spinner("読み込み中...", console.resume()).await
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "portfolio_admin=debug,portfolio_admin_common=debug"
    } else {
        "portfolio_admin=warn,portfolio_admin_common=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
