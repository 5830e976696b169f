use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portfolio-admin")]
#[command(about = "クライアント・ポートフォリオ管理コンソール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 接続先サービスのベースURL（設定ファイルより優先）
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ログインしてトークンを保存
    Login {
        /// ユーザー名（省略時は入力を求める）
        #[arg(short, long)]
        username: Option<String>,

        /// パスワード（省略時は入力を求める）
        #[arg(short, long)]
        password: Option<String>,
    },

    /// クライアント管理
    Clients {
        #[command(subcommand)]
        action: ClientCommand,
    },

    /// ポートフォリオ作品管理
    Projects {
        #[command(subcommand)]
        action: ProjectCommand,
    },

    /// 対話式コンソールを起動
    Console,

    /// 設定を表示/編集
    Config {
        /// ベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum ClientCommand {
    /// 一覧表示
    List,

    /// 追加
    Add {
        /// クライアント名
        #[arg(short, long)]
        name: String,

        /// ロゴ画像ファイル
        #[arg(short, long)]
        image: PathBuf,
    },

    /// 削除
    Delete {
        /// クライアントID
        #[arg(required = true)]
        id: String,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// 一覧表示
    List,

    /// 追加
    Add {
        /// タイトル
        #[arg(short, long)]
        title: String,

        /// カテゴリ
        #[arg(short, long, default_value = "")]
        category: String,

        /// タイプ
        #[arg(long = "type", default_value = "")]
        kind: String,

        /// 向き (Landscape / Portrait)
        #[arg(short, long, default_value = "")]
        orientation: String,

        /// 動画URL
        #[arg(long, default_value = "")]
        video: String,

        /// サムネイル画像ファイル
        #[arg(short, long)]
        image: PathBuf,
    },

    /// 削除
    Delete {
        /// 作品ID
        #[arg(required = true)]
        id: String,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },
}
