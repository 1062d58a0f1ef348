//! HTTP 实现 - 远程酒店 API 后端
//!
//! 向酒店 PMS 发起基于 HTTP 的网络调用。
//!
//! # 错误映射
//!
//! | HTTP 状态 | ProviderError |
//! |-----------|---------------|
//! | 404 | NotFound |
//! | 409 | Conflict |
//! | 400 / 422 | Validation |
//! | 其他非 2xx | Upstream |
//!
//! 本层不做自动重试；网络错误原样上抛，由操作员决定重试。

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shared::models::{
    CheckoutRecord, CompanyLedgerEntry, CompanyLedgerEntryCreate, HotelSettings, NightAuditRun,
    NightAuditRunDraft, Payment, PaymentCreate, Room, RoomStatus, Stay, StayStatus,
};

use super::{
    CompanyLedgerProvider, NightAuditProvider, PaymentProvider, ProviderError, ProviderResult,
    SettingsProvider, StayProvider,
};

/// HTTP 客户端
///
/// # 示例
///
/// ```ignore
/// let backend = HttpProviders::new("https://pms.example.com", 30_000)
///     .with_token("api-token");
/// let providers = Providers::http(Arc::new(backend));
/// ```
#[derive(Debug, Clone)]
pub struct HttpProviders {
    /// HTTP 客户端
    client: Client,
    /// 远程 API 地址
    base_url: String,
    /// 访问令牌
    token: Option<String>,
}

impl HttpProviders {
    /// 创建 HTTP 后端
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// 设置访问令牌
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn handle_response<T: DeserializeOwned>(
        op: &'static str,
        entity: &'static str,
        ident: String,
        response: reqwest::Response,
    ) -> ProviderResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => ProviderError::not_found(op, entity, ident),
                StatusCode::CONFLICT => ProviderError::conflict(op, text),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ProviderError::validation(op, text)
                }
                _ => ProviderError::upstream(op, format!("HTTP {}: {}", status, text)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::upstream(op, e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        entity: &'static str,
        ident: impl ToString,
        path: String,
    ) -> ProviderResult<T> {
        let mut request = self.client.get(self.url(&path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::upstream(op, e.to_string()))?;
        Self::handle_response(op, entity, ident.to_string(), response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        op: &'static str,
        entity: &'static str,
        ident: impl ToString,
        path: String,
        body: &B,
    ) -> ProviderResult<T> {
        let mut request = self.client.post(self.url(&path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::upstream(op, e.to_string()))?;
        Self::handle_response(op, entity, ident.to_string(), response).await
    }

    /// POST 且不关心响应体的变更调用
    async fn post_unit<B: Serialize + Sync>(
        &self,
        op: &'static str,
        entity: &'static str,
        ident: impl ToString,
        path: String,
        body: &B,
    ) -> ProviderResult<()> {
        let mut request = self.client.post(self.url(&path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::upstream(op, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => ProviderError::not_found(op, entity, ident.to_string()),
                StatusCode::CONFLICT => ProviderError::conflict(op, text),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ProviderError::validation(op, text)
                }
                _ => ProviderError::upstream(op, format!("HTTP {}: {}", status, text)),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for HttpProviders {
    async fn hotel_settings(&self) -> ProviderResult<HotelSettings> {
        self.get_json("hotel_settings", "settings", "hotel", "api/settings/hotel".to_string())
            .await
    }
}

#[async_trait]
impl StayProvider for HttpProviders {
    async fn stay(&self, id: i64) -> ProviderResult<Stay> {
        self.get_json("stay", "stay", id, format!("api/stays/{}", id)).await
    }

    async fn room(&self, id: i64) -> ProviderResult<Room> {
        self.get_json("room", "room", id, format!("api/rooms/{}", id)).await
    }

    async fn rooms(&self) -> ProviderResult<Vec<Room>> {
        self.get_json("rooms", "room", "all", "api/rooms".to_string()).await
    }

    async fn unposted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>> {
        self.get_json(
            "unposted_stays",
            "stay",
            date,
            format!("api/stays/unposted?date={}", date),
        )
        .await
    }

    async fn posted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>> {
        self.get_json(
            "posted_stays",
            "stay",
            date,
            format!("api/stays/posted?date={}", date),
        )
        .await
    }

    async fn set_stay_status(&self, id: i64, status: StayStatus) -> ProviderResult<()> {
        #[derive(Serialize)]
        struct Body {
            status: StayStatus,
        }
        self.post_unit(
            "set_stay_status",
            "stay",
            id,
            format!("api/stays/{}/status", id),
            &Body { status },
        )
        .await
    }

    async fn set_room_status(&self, id: i64, status: RoomStatus) -> ProviderResult<()> {
        #[derive(Serialize)]
        struct Body {
            status: RoomStatus,
        }
        self.post_unit(
            "set_room_status",
            "room",
            id,
            format!("api/rooms/{}/status", id),
            &Body { status },
        )
        .await
    }

    async fn mark_posted(&self, id: i64, date: NaiveDate) -> ProviderResult<()> {
        #[derive(Serialize)]
        struct Body {
            posted_date: NaiveDate,
        }
        self.post_unit(
            "mark_posted",
            "stay",
            id,
            format!("api/stays/{}/posted", id),
            &Body { posted_date: date },
        )
        .await
    }

    async fn unmark_posted(&self, id: i64) -> ProviderResult<()> {
        self.post_unit(
            "unmark_posted",
            "stay",
            id,
            format!("api/stays/{}/unposted", id),
            &(),
        )
        .await
    }

    async fn record_checkout(&self, record: &CheckoutRecord) -> ProviderResult<()> {
        self.post_unit(
            "record_checkout",
            "stay",
            record.stay_id,
            format!("api/stays/{}/checkout", record.stay_id),
            record,
        )
        .await
    }
}

#[async_trait]
impl PaymentProvider for HttpProviders {
    async fn payments_for_stay(&self, stay_id: i64) -> ProviderResult<Vec<Payment>> {
        self.get_json(
            "payments_for_stay",
            "stay",
            stay_id,
            format!("api/stays/{}/payments", stay_id),
        )
        .await
    }

    async fn record_payment(&self, create: &PaymentCreate) -> ProviderResult<Payment> {
        self.post_json(
            "record_payment",
            "stay",
            create.stay_id,
            "api/payments".to_string(),
            create,
        )
        .await
    }

    async fn record_refund(&self, create: &PaymentCreate) -> ProviderResult<Payment> {
        self.post_json(
            "record_refund",
            "stay",
            create.stay_id,
            "api/payments/refund".to_string(),
            create,
        )
        .await
    }
}

#[async_trait]
impl CompanyLedgerProvider for HttpProviders {
    async fn create_entry(
        &self,
        create: &CompanyLedgerEntryCreate,
    ) -> ProviderResult<CompanyLedgerEntry> {
        self.post_json(
            "create_ledger_entry",
            "company",
            create.company_id,
            "api/company-ledger".to_string(),
            create,
        )
        .await
    }
}

#[async_trait]
impl NightAuditProvider for HttpProviders {
    async fn create_run(&self, draft: &NightAuditRunDraft) -> ProviderResult<NightAuditRun> {
        self.post_json(
            "create_audit_run",
            "night_audit",
            draft.audit_date,
            "api/night-audit/runs".to_string(),
            draft,
        )
        .await
    }

    async fn find_run(&self, date: NaiveDate) -> ProviderResult<Option<NightAuditRun>> {
        match self
            .get_json::<NightAuditRun>(
                "find_audit_run",
                "night_audit",
                date,
                format!("api/night-audit/runs/date/{}", date),
            )
            .await
        {
            Ok(run) => Ok(Some(run)),
            Err(ProviderError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_runs(&self, limit: i64, offset: i64) -> ProviderResult<Vec<NightAuditRun>> {
        self.get_json(
            "list_audit_runs",
            "night_audit",
            "all",
            format!("api/night-audit/runs?limit={}&offset={}", limit, offset),
        )
        .await
    }

    async fn run_by_id(&self, id: i64) -> ProviderResult<NightAuditRun> {
        self.get_json(
            "audit_run_by_id",
            "night_audit",
            id,
            format!("api/night-audit/runs/{}", id),
        )
        .await
    }
}
