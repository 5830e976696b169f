//! エンティティ型定義
//!
//! CLIと対話コンソールで共有される型:
//! - Client: クライアント（ロゴ画像付き）
//! - PortfolioItem: ポートフォリオ作品
//! - SessionToken / LoginRequest / LoginResponse: 認証まわり
//! - UploadFile: アップロード対象のローカルファイル

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// ミラー内で同一性を判定するためのキー
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

/// クライアント
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClientWire")]
pub struct Client {
    /// サービス側で採番されたID（受信時は `_id` を優先し、なければ `id`）
    pub id: String,

    pub name: String,

    /// 保存済み画像のURL
    #[serde(default)]
    pub image: String,
}

impl Entity for Client {
    fn id(&self) -> &str {
        &self.id
    }
}

/// ポートフォリオ作品
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PortfolioItemWire")]
pub struct PortfolioItem {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub category: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub orientation: String,

    /// 動画URL（空文字可）
    #[serde(default)]
    pub video: String,

    #[serde(default)]
    pub image: String,
}

impl Entity for PortfolioItem {
    fn id(&self) -> &str {
        &self.id
    }
}

// `_id` と `id` を両方送ってくるバックエンドがあるため、受信時は別々に読む
#[derive(Deserialize)]
struct ClientWire {
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    image: String,
}

impl TryFrom<ClientWire> for Client {
    type Error = String;

    fn try_from(wire: ClientWire) -> std::result::Result<Self, Self::Error> {
        Ok(Client {
            id: pick_id(wire.mongo_id, wire.id)?,
            name: wire.name,
            image: wire.image,
        })
    }
}

#[derive(Deserialize)]
struct PortfolioItemWire {
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    category: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    orientation: String,
    #[serde(default)]
    video: String,
    #[serde(default)]
    image: String,
}

impl TryFrom<PortfolioItemWire> for PortfolioItem {
    type Error = String;

    fn try_from(wire: PortfolioItemWire) -> std::result::Result<Self, Self::Error> {
        Ok(PortfolioItem {
            id: pick_id(wire.mongo_id, wire.id)?,
            title: wire.title,
            category: wire.category,
            kind: wire.kind,
            orientation: wire.orientation,
            video: wire.video,
            image: wire.image,
        })
    }
}

fn pick_id(mongo_id: Option<String>, id: Option<String>) -> std::result::Result<String, String> {
    mongo_id
        .or(id)
        .ok_or_else(|| "missing field `_id` or `id`".to_string())
}

/// セッショントークン（中身は不透明な文字列）
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// トークン本体はログやDebug出力に出さない
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// ログインリクエスト
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// ログインレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: SessionToken,
}

/// アップロード対象ファイル（ファイル選択ダイアログの代わり）
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// ディスク上のファイルを読み込む
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

const IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
];

/// 拡張子からMIMEタイプを推定
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    IMAGE_MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}
