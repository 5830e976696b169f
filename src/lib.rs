//! Portfolio Admin
//!
//! ログイン状態でゲートされた、クライアント/ポートフォリオ作品の同期コントローラと
//! そのCLI・対話コンソール

pub mod cli;
pub mod config;
pub mod console;
pub mod credential;
pub mod error;
pub mod interactive;
pub mod remote;
