//! reqwestによるHTTP実装

use super::{
    Created, PortfolioApi, RemoteError, RemoteResult, ADD_CLIENT_PATH, ADD_PROJECT_PATH,
    DELETE_CLIENT_PATH, DELETE_PROJECT_PATH, LIST_CLIENTS_PATH, LIST_PROJECTS_PATH, LOGIN_PATH,
};
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use portfolio_admin_common::{
    Client, ClientForm, LoginRequest, LoginResponse, PortfolioForm, PortfolioItem, SessionToken,
    UploadFile,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// エラーメッセージに載せる本文の最大文字数
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Config(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Self::with_client(base_url, client)
    }

    /// 構築済みのクライアントを使う（プロキシやTLS設定を呼び出し側で決める場合）
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AdminError::Config(format!("ベースURLが不正です: {} ({})", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AdminError::Config(format!("ベースURLが不正です: {}", base_url)));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// ベースURLにパスを連結。IDは1セグメントとしてエンコードする
    pub fn endpoint(&self, path: &str, id: Option<&str>) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::Request(format!("invalid base URL: {}", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&SessionToken>) -> RequestBuilder {
        tracing::debug!(%method, %url, "remote request");
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> RemoteResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

        tracing::debug!(status, bytes = body.len(), "remote response");
        check_status(status, body)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, token: &SessionToken) -> RemoteResult<Vec<T>> {
        let url = self.endpoint(path, None)?;
        let body = self.execute(self.request(Method::GET, url, Some(token))).await?;
        decode(&body)
    }

    async fn create<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SessionToken,
        form: Form,
    ) -> RemoteResult<Created<T>> {
        let url = self.endpoint(path, None)?;
        let body = self
            .execute(self.request(Method::POST, url, Some(token)).multipart(form))
            .await?;
        Ok(decode_created(&body))
    }

    async fn delete(&self, path: &str, token: &SessionToken, id: &str) -> RemoteResult<()> {
        let url = self.endpoint(path, Some(id))?;
        self.execute(self.request(Method::DELETE, url, Some(token))).await?;
        Ok(())
    }
}

#[async_trait]
impl PortfolioApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> RemoteResult<SessionToken> {
        let url = self.endpoint(LOGIN_PATH, None)?;
        let body = self
            .execute(self.request(Method::POST, url, None).json(request))
            .await?;
        let response: LoginResponse = decode(&body)?;
        Ok(response.token)
    }

    async fn list_clients(&self, token: &SessionToken) -> RemoteResult<Vec<Client>> {
        self.list(LIST_CLIENTS_PATH, token).await
    }

    async fn list_projects(&self, token: &SessionToken) -> RemoteResult<Vec<PortfolioItem>> {
        self.list(LIST_PROJECTS_PATH, token).await
    }

    async fn add_client(&self, token: &SessionToken, form: &ClientForm) -> RemoteResult<Created<Client>> {
        // クライアントIDは送信側で採番する
        let id = uuid::Uuid::new_v4().to_string();
        let multipart = multipart_form(client_fields(form, &id), &form.file)?;
        self.create(ADD_CLIENT_PATH, token, multipart).await
    }

    async fn add_project(
        &self,
        token: &SessionToken,
        form: &PortfolioForm,
    ) -> RemoteResult<Created<PortfolioItem>> {
        let multipart = multipart_form(project_fields(form), &form.file)?;
        self.create(ADD_PROJECT_PATH, token, multipart).await
    }

    async fn delete_client(&self, token: &SessionToken, id: &str) -> RemoteResult<()> {
        self.delete(DELETE_CLIENT_PATH, token, id).await
    }

    async fn delete_project(&self, token: &SessionToken, id: &str) -> RemoteResult<()> {
        self.delete(DELETE_PROJECT_PATH, token, id).await
    }
}

/// クライアント作成のテキスト項目
pub fn client_fields(form: &ClientForm, id: &str) -> Vec<(&'static str, String)> {
    vec![("id", id.to_string()), ("name", form.name.clone())]
}

/// 作品作成のテキスト項目
pub fn project_fields(form: &PortfolioForm) -> Vec<(&'static str, String)> {
    vec![
        ("title", form.title.clone()),
        ("category", form.category.clone()),
        ("type", form.kind.clone()),
        ("orientation", form.orientation.clone()),
        ("video", form.video.clone()),
    ]
}

fn multipart_form(fields: Vec<(&'static str, String)>, file: &UploadFile) -> RemoteResult<Form> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| RemoteError::Request(e.to_string()))?;

    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part("file", part))
}

/// 2xx以外は拒否として扱う
pub(crate) fn check_status(status: u16, body: String) -> RemoteResult<String> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(RemoteError::Rejected {
            status,
            message: summarize_body(&body),
        })
    }
}

/// エラー本文から `message` / `error` を取り出す。なければ先頭だけ
fn summarize_body(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = map.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect()
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))
}

/// 作成APIはエンティティか受理応答のどちらかを返す
pub(crate) fn decode_created<T: DeserializeOwned>(body: &str) -> Created<T> {
    match serde_json::from_str::<T>(body) {
        Ok(entity) => Created::Entity(entity),
        Err(_) => Created::Acknowledged,
    }
}
