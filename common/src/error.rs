//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 送信前の入力チェックに失敗（通信は発生していない）
    #[error("Validation error: {0}")]
    Validation(String),

    /// アップロード対象ファイルの読み込み失敗
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
