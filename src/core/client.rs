use crate::config::ClientConfig;
use crate::core::query::{resource_url, ToQuery};
use crate::domain::model::{
    Invitation, NewUser, ProcedureFilter, TaskInstanceFilter, UserFilter, UserUpdate,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WwdError};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, validate_url};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Request, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("waywedo-client/", env!("CARGO_PKG_VERSION"));

/// 任務管理 REST API 的客戶端
///
/// 授權標頭在建構時固定下來，之後每個請求都沿用；實例本身沒有可變狀態，
/// clone 之後共用同一個連線池。
#[derive(Debug, Clone)]
pub struct WayWeDoClient {
    client: Client,
    base_url: Url,
}

/// 送出邀請時的實際 payload，`user` 已轉成資源 URL
#[derive(Debug, Serialize)]
struct InvitationPayload<'a> {
    send_email: bool,
    content_type: &'a str,
    permission: &'a str,
    object_id: u64,
    user: String,
}

impl WayWeDoClient {
    /// 沒有 token 時直接回傳配置錯誤，不會送出任何請求
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let token = config
            .api_token()
            .ok_or_else(|| WwdError::MissingConfigError {
                field: "api_token".to_string(),
            })?;
        validate_non_empty_string("api_token", token)?;

        let base_url = normalize_base_url(config.base_url())?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            WwdError::InvalidConfigValueError {
                field: "api_token".to_string(),
                value: "<redacted>".to_string(),
                reason: "Token contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT);

        if let Some(timeout) = config.timeout_seconds() {
            validate_positive_number("timeout_seconds", timeout, 1)?;
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder.build()?;

        tracing::debug!("Client configured for {}", base_url);

        Ok(Self { client, base_url })
    }

    /// 從 `WAYWEDO_*` 環境變數建立客戶端
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 使用者的資源 URL，供 `assignee` 與邀請對象使用
    pub fn user_url(&self, user_id: u64) -> Result<Url> {
        resource_url(&self.base_url, "users", user_id)
    }

    pub async fn list_procedures(&self, filter: &ProcedureFilter) -> Result<Value> {
        let request = self.build_list_request("procedures/", filter)?;
        self.execute_json(request).await
    }

    pub async fn list_task_instances(&self, filter: &TaskInstanceFilter) -> Result<Value> {
        let request = self.build_list_request("taskinstances/", filter)?;
        self.execute_json(request).await
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Value> {
        let request = self.build_list_request("users/", filter)?;
        self.execute_json(request).await
    }

    /// 邀請（建立）使用者
    pub async fn create_user(&self, user: &NewUser) -> Result<Value> {
        let request = self.client.post(self.endpoint("users/")?).json(user).build()?;
        self.execute_json(request).await
    }

    pub async fn update_user(&self, user_id: u64, update: &UserUpdate) -> Result<Value> {
        let url = resource_url(&self.base_url, "users", user_id)?;
        let request = self.client.patch(url).json(update).build()?;
        self.execute_json(request).await
    }

    /// 回傳原始狀態碼，成功為 204；非成功狀態不視為錯誤
    pub async fn delete_user(&self, user_id: u64) -> Result<u16> {
        let url = resource_url(&self.base_url, "users", user_id)?;
        self.execute_status(self.client.delete(url).build()?).await
    }

    pub async fn create_invitation(&self, invitation: &Invitation) -> Result<Value> {
        let request = self.build_invitation_request(invitation)?;
        self.execute_json(request).await
    }

    /// 移除團隊成員關係，行為同 `delete_user`
    pub async fn delete_team_user(&self, team_user_id: u64) -> Result<u16> {
        let url = resource_url(&self.base_url, "teamusers", team_user_id)?;
        self.execute_status(self.client.delete(url).build()?).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn build_list_request<F: ToQuery>(&self, path: &str, filter: &F) -> Result<Request> {
        let params = filter.to_query(&self.base_url)?;
        let mut builder = self.client.get(self.endpoint(path)?);
        if !params.is_empty() {
            builder = builder.query(params.as_pairs());
        }
        Ok(builder.build()?)
    }

    pub(crate) fn build_invitation_request(&self, invitation: &Invitation) -> Result<Request> {
        // 服務端只接受陣列，即使只有一筆
        let payload = [InvitationPayload {
            send_email: invitation.send_email,
            content_type: &invitation.content_type,
            permission: &invitation.permission,
            object_id: invitation.object_id,
            user: self.user_url(invitation.user)?.to_string(),
        }];
        Ok(self
            .client
            .post(self.endpoint("invitations/")?)
            .json(&payload)
            .build()?)
    }

    async fn execute_json(&self, request: Request) -> Result<Value> {
        let response = self.send(request).await?;
        json_body(response).await
    }

    async fn execute_status(&self, request: Request) -> Result<u16> {
        let response = self.send(request).await?;
        Ok(response.status().as_u16())
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!("📡 {} {}", method, url);

        let response = self.client.execute(request).await?;

        tracing::debug!("📡 {} {} -> {}", method, url, response.status());
        Ok(response)
    }
}

async fn json_body(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!("Request to {} failed with status {}", response.url(), status);
        return Err(WwdError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// 補上結尾的 `/`，否則 `join` 會把版本路徑段吃掉
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    validate_url("base_url", trimmed)?;
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{}/", trimmed))?)
    }
}
