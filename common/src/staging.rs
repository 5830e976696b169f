//! 入力ステージング（未送信フォーム）
//!
//! 新規クライアント・新規作品の入力途中の値を保持する。
//! 送信が成功したときだけ空に戻し、失敗時は入力を残す。

use crate::error::{Error, Result};
use crate::types::UploadFile;

/// フォーム下書き
pub trait Draft: Default + Clone {
    /// 編集可能なテキスト項目
    type Field: Copy;
    /// 検証済みの送信内容
    type Form;

    fn set_field(&mut self, field: Self::Field, value: String);
    fn field(&self, field: Self::Field) -> &str;
    fn set_image(&mut self, image: Option<UploadFile>);
    fn image(&self) -> Option<&UploadFile>;

    /// 必須項目の有無のみチェック
    fn validate(&self) -> Result<Self::Form>;
}

/// 下書きを1つ保持するバッファ
#[derive(Debug, Clone, Default)]
pub struct StagingBuffer<D> {
    draft: D,
}

impl<D: Draft> StagingBuffer<D> {
    pub fn new() -> Self {
        Self { draft: D::default() }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// 項目単位で上書き（後勝ち）
    pub fn set(&mut self, field: D::Field, value: impl Into<String>) {
        self.draft.set_field(field, value.into());
    }

    pub fn set_image(&mut self, image: UploadFile) {
        self.draft.set_image(Some(image));
    }

    /// 送信用のフォームを作成（下書き自体は変更しない）
    pub fn submission(&self) -> Result<D::Form> {
        self.draft.validate()
    }

    /// 送信成功時のみ呼ぶ
    pub fn clear(&mut self) {
        self.draft = D::default();
    }
}

/// 新規クライアントの下書き
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub image: Option<UploadFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
}

impl ClientField {
    pub const ALL: [ClientField; 1] = [ClientField::Name];

    pub fn label(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
        }
    }
}

/// 検証済みクライアント送信内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientForm {
    pub name: String,
    pub file: UploadFile,
}

impl Draft for ClientDraft {
    type Field = ClientField;
    type Form = ClientForm;

    fn set_field(&mut self, field: ClientField, value: String) {
        match field {
            ClientField::Name => self.name = value,
        }
    }

    fn field(&self, field: ClientField) -> &str {
        match field {
            ClientField::Name => &self.name,
        }
    }

    fn set_image(&mut self, image: Option<UploadFile>) {
        self.image = image;
    }

    fn image(&self) -> Option<&UploadFile> {
        self.image.as_ref()
    }

    fn validate(&self) -> Result<ClientForm> {
        match (&self.image, is_blank(&self.name)) {
            (Some(file), false) => Ok(ClientForm {
                name: self.name.clone(),
                file: file.clone(),
            }),
            _ => Err(Error::Validation(
                "Please provide a name and an image for the client.".into(),
            )),
        }
    }
}

/// 新規ポートフォリオ作品の下書き
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioDraft {
    pub title: String,
    pub category: String,
    pub kind: String,
    pub orientation: String,
    pub video: String,
    pub image: Option<UploadFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioField {
    Title,
    Category,
    Kind,
    Orientation,
    Video,
}

impl PortfolioField {
    pub const ALL: [PortfolioField; 5] = [
        PortfolioField::Title,
        PortfolioField::Category,
        PortfolioField::Video,
        PortfolioField::Orientation,
        PortfolioField::Kind,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PortfolioField::Title => "title",
            PortfolioField::Category => "category",
            PortfolioField::Kind => "type",
            PortfolioField::Orientation => "orientation (Landscape / Portrait)",
            PortfolioField::Video => "video URL",
        }
    }
}

/// 検証済み作品送信内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioForm {
    pub title: String,
    pub category: String,
    pub kind: String,
    pub orientation: String,
    pub video: String,
    pub file: UploadFile,
}

impl Draft for PortfolioDraft {
    type Field = PortfolioField;
    type Form = PortfolioForm;

    fn set_field(&mut self, field: PortfolioField, value: String) {
        let slot = match field {
            PortfolioField::Title => &mut self.title,
            PortfolioField::Category => &mut self.category,
            PortfolioField::Kind => &mut self.kind,
            PortfolioField::Orientation => &mut self.orientation,
            PortfolioField::Video => &mut self.video,
        };
        *slot = value;
    }

    fn field(&self, field: PortfolioField) -> &str {
        match field {
            PortfolioField::Title => &self.title,
            PortfolioField::Category => &self.category,
            PortfolioField::Kind => &self.kind,
            PortfolioField::Orientation => &self.orientation,
            PortfolioField::Video => &self.video,
        }
    }

    fn set_image(&mut self, image: Option<UploadFile>) {
        self.image = image;
    }

    fn image(&self) -> Option<&UploadFile> {
        self.image.as_ref()
    }

    // 必須はタイトルと画像のみ。その他の項目は空文字のまま送る
    fn validate(&self) -> Result<PortfolioForm> {
        match (&self.image, is_blank(&self.title)) {
            (Some(file), false) => Ok(PortfolioForm {
                title: self.title.clone(),
                category: self.category.clone(),
                kind: self.kind.clone(),
                orientation: self.orientation.clone(),
                video: self.video.clone(),
                file: file.clone(),
            }),
            _ => Err(Error::Validation(
                "Please provide all fields and an image for the portfolio item.".into(),
            )),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
