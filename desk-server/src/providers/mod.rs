//! 数据源抽象 - 远程酒店 API 的语义接口
//!
//! 预订、客房、付款、挂账、夜审的持久化全部属于远程酒店 API；
//! 本模块只定义语义操作，不规定线格式。
//!
//! # 实现
//!
//! - [`http`] - reqwest 实现，生产环境使用
//! - [`memory`] - 内存实现，测试与本地开发使用
//!
//! # 幂等性
//!
//! 两个关键的幂等约束由服务端兜底，客户端只拦截常见情形：
//!
//! - `create_run` 对同一 `audit_date` 的第二次调用必须被拒绝
//!   (服务端对 audit_date 的唯一约束)；
//! - 已退还押金的再次退款必须被拒绝。

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{
    CheckoutRecord, CompanyLedgerEntry, CompanyLedgerEntryCreate, HotelSettings, NightAuditRun,
    NightAuditRunDraft, Payment, PaymentCreate, Room, RoomStatus, Stay, StayStatus,
};

pub use self::http::HttpProviders;
pub use memory::MemoryProviders;

/// Provider 调用错误
///
/// 每个变体都携带操作名和标识符，让调用方决定重试还是中止。
/// 本层不做自动重试 —— 重试策略属于传输层。
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("{operation}: {entity} {id} not found")]
    NotFound {
        operation: &'static str,
        entity: &'static str,
        id: String,
    },

    #[error("{operation}: conflict: {message}")]
    Conflict {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: invalid request: {message}")]
    Validation {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: upstream failure: {message}")]
    Upstream {
        operation: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn not_found(operation: &'static str, entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            operation,
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            operation,
            message: message.into(),
        }
    }

    pub fn validation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            operation,
            message: message.into(),
        }
    }

    pub fn upstream(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            message: message.into(),
        }
    }

    /// 冲突类错误是可恢复的用户可见状态，不是故障
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// 酒店参数接口
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn hotel_settings(&self) -> ProviderResult<HotelSettings>;
}

/// 预订/客房接口
#[async_trait]
pub trait StayProvider: Send + Sync {
    async fn stay(&self, id: i64) -> ProviderResult<Stay>;

    async fn room(&self, id: i64) -> ProviderResult<Room>;

    /// 全部客房，用于夜审房态快照
    async fn rooms(&self) -> ProviderResult<Vec<Room>>;

    /// 指定日期内未过账的预订 (见 night_audit::poster 的口径)
    async fn unposted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>>;

    /// 指定夜审日期已过账的预订，用于报表导出
    async fn posted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>>;

    async fn set_stay_status(&self, id: i64, status: StayStatus) -> ProviderResult<()>;

    async fn set_room_status(&self, id: i64, status: RoomStatus) -> ProviderResult<()>;

    /// 夜审过账标记，锁定预订不再允许编辑
    async fn mark_posted(&self, id: i64, date: NaiveDate) -> ProviderResult<()>;

    /// 撤销过账标记 (仅用于夜审批量失败时的补偿回退)
    async fn unmark_posted(&self, id: i64) -> ProviderResult<()>;

    /// 退房结算写入 (罚金/备注仅在罚金 > 0 时出现)
    async fn record_checkout(&self, record: &CheckoutRecord) -> ProviderResult<()>;
}

/// 付款接口，台账按预订只增不改
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn payments_for_stay(&self, stay_id: i64) -> ProviderResult<Vec<Payment>>;

    async fn record_payment(&self, create: &PaymentCreate) -> ProviderResult<Payment>;

    /// 生成一条状态为 refunded 的新记录，绝不修改已有记录
    async fn record_refund(&self, create: &PaymentCreate) -> ProviderResult<Payment>;
}

/// 公司挂账接口
#[async_trait]
pub trait CompanyLedgerProvider: Send + Sync {
    async fn create_entry(
        &self,
        create: &CompanyLedgerEntryCreate,
    ) -> ProviderResult<CompanyLedgerEntry>;
}

/// 夜审接口
#[async_trait]
pub trait NightAuditProvider: Send + Sync {
    /// 创建夜审记录；同一 audit_date 已存在时必须返回 Conflict
    async fn create_run(&self, draft: &NightAuditRunDraft) -> ProviderResult<NightAuditRun>;

    async fn find_run(&self, date: NaiveDate) -> ProviderResult<Option<NightAuditRun>>;

    async fn list_runs(&self, limit: i64, offset: i64) -> ProviderResult<Vec<NightAuditRun>>;

    async fn run_by_id(&self, id: i64) -> ProviderResult<NightAuditRun>;
}

/// 数据源句柄集合
///
/// 持有五个 provider 的共享引用；Clone 是浅拷贝。
#[derive(Clone)]
pub struct Providers {
    pub settings: Arc<dyn SettingsProvider>,
    pub stays: Arc<dyn StayProvider>,
    pub payments: Arc<dyn PaymentProvider>,
    pub company_ledger: Arc<dyn CompanyLedgerProvider>,
    pub night_audit: Arc<dyn NightAuditProvider>,
}

impl Providers {
    /// 以远程酒店 API 为后端
    pub fn http(backend: Arc<HttpProviders>) -> Self {
        Self {
            settings: backend.clone(),
            stays: backend.clone(),
            payments: backend.clone(),
            company_ledger: backend.clone(),
            night_audit: backend,
        }
    }

    /// 以内存实现为后端 (测试/本地开发)
    pub fn in_memory(backend: Arc<MemoryProviders>) -> Self {
        Self {
            settings: backend.clone(),
            stays: backend.clone(),
            payments: backend.clone(),
            company_ledger: backend.clone(),
            night_audit: backend,
        }
    }
}
