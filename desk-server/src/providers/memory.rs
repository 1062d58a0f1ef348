//! 内存实现 - 测试与本地开发后端
//!
//! 在进程内模拟远程酒店 API 的语义，包括两条服务端幂等约束：
//! 同一 `audit_date` 只允许一条夜审记录、已退押金拒绝再次退款。
//! 测试通过注入故障 (见 `fail_*` 方法) 验证补偿回退路径。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use shared::models::{
    CheckoutRecord, CompanyLedgerEntry, CompanyLedgerEntryCreate, HotelSettings, NightAuditRun,
    NightAuditRunDraft, Payment, PaymentCreate, PaymentStatus, Room, RoomStatus, Stay, StayStatus,
};

use super::{
    CompanyLedgerProvider, NightAuditProvider, PaymentProvider, ProviderError, ProviderResult,
    SettingsProvider, StayProvider,
};

#[derive(Default)]
struct Inner {
    settings: HotelSettings,
    stays: HashMap<i64, Stay>,
    rooms: HashMap<i64, Room>,
    payments: Vec<Payment>,
    ledger: Vec<CompanyLedgerEntry>,
    runs: Vec<NightAuditRun>,
    checkouts: Vec<CheckoutRecord>,
}

/// 内存后端
pub struct MemoryProviders {
    inner: RwLock<Inner>,
    next_id: AtomicI64,
    // 故障注入，仅测试使用
    fail_mark_posted: RwLock<HashSet<i64>>,
    fail_create_run: AtomicBool,
    fail_company_ledger: AtomicBool,
}

impl MemoryProviders {
    pub fn new(settings: HotelSettings) -> Self {
        Self {
            inner: RwLock::new(Inner {
                settings,
                ..Default::default()
            }),
            next_id: AtomicI64::new(1),
            fail_mark_posted: RwLock::new(HashSet::new()),
            fail_create_run: AtomicBool::new(false),
            fail_company_ledger: AtomicBool::new(false),
        }
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    // ========== Seeding ==========

    pub fn insert_room(&self, room: Room) {
        self.inner.write().rooms.insert(room.id, room);
    }

    pub fn insert_stay(&self, stay: Stay) {
        self.inner.write().stays.insert(stay.id, stay);
    }

    pub fn insert_payment(&self, payment: Payment) {
        self.inner.write().payments.push(payment);
    }

    // ========== Test accessors ==========

    pub fn stay_by_id(&self, id: i64) -> Option<Stay> {
        self.inner.read().stays.get(&id).cloned()
    }

    pub fn room_by_id(&self, id: i64) -> Option<Room> {
        self.inner.read().rooms.get(&id).cloned()
    }

    pub fn all_payments(&self) -> Vec<Payment> {
        self.inner.read().payments.clone()
    }

    pub fn ledger_entries(&self) -> Vec<CompanyLedgerEntry> {
        self.inner.read().ledger.clone()
    }

    pub fn audit_runs(&self) -> Vec<NightAuditRun> {
        self.inner.read().runs.clone()
    }

    pub fn checkout_records(&self) -> Vec<CheckoutRecord> {
        self.inner.read().checkouts.clone()
    }

    // ========== Failure injection ==========

    /// 让指定预订的过账标记调用失败一次
    pub fn fail_mark_posted_for(&self, stay_id: i64) {
        self.fail_mark_posted.write().insert(stay_id);
    }

    /// 让下一次夜审记录创建失败
    pub fn fail_next_create_run(&self) {
        self.fail_create_run.store(true, Ordering::SeqCst);
    }

    /// 让下一次公司挂账创建失败
    pub fn fail_next_company_posting(&self) {
        self.fail_company_ledger.store(true, Ordering::SeqCst);
    }

    /// 夜审口径：未锁定、未取消，且该日期落在住宿区间内或当日退房
    fn eligible_for_audit(stay: &Stay, date: NaiveDate) -> bool {
        if stay.is_posted {
            return false;
        }
        if matches!(stay.status, StayStatus::Cancelled | StayStatus::NoShow) {
            return false;
        }
        (stay.check_in_date <= date && date < stay.check_out_date)
            || stay.check_out_date == date
    }
}

#[async_trait]
impl SettingsProvider for MemoryProviders {
    async fn hotel_settings(&self) -> ProviderResult<HotelSettings> {
        Ok(self.inner.read().settings.clone())
    }
}

#[async_trait]
impl StayProvider for MemoryProviders {
    async fn stay(&self, id: i64) -> ProviderResult<Stay> {
        self.inner
            .read()
            .stays
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("stay", "stay", id))
    }

    async fn room(&self, id: i64) -> ProviderResult<Room> {
        self.inner
            .read()
            .rooms
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("room", "room", id))
    }

    async fn rooms(&self) -> ProviderResult<Vec<Room>> {
        Ok(self.inner.read().rooms.values().cloned().collect())
    }

    async fn unposted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>> {
        let mut stays: Vec<Stay> = self
            .inner
            .read()
            .stays
            .values()
            .filter(|s| Self::eligible_for_audit(s, date))
            .cloned()
            .collect();
        stays.sort_by_key(|s| (s.check_in_date, s.id));
        Ok(stays)
    }

    async fn posted_stays(&self, date: NaiveDate) -> ProviderResult<Vec<Stay>> {
        let mut stays: Vec<Stay> = self
            .inner
            .read()
            .stays
            .values()
            .filter(|s| s.posted_date == Some(date))
            .cloned()
            .collect();
        stays.sort_by_key(|s| (s.room_number.clone(), s.check_in_date));
        Ok(stays)
    }

    async fn set_stay_status(&self, id: i64, status: StayStatus) -> ProviderResult<()> {
        let mut inner = self.inner.write();
        let stay = inner
            .stays
            .get_mut(&id)
            .ok_or_else(|| ProviderError::not_found("set_stay_status", "stay", id))?;
        stay.status = status;
        Ok(())
    }

    async fn set_room_status(&self, id: i64, status: RoomStatus) -> ProviderResult<()> {
        let mut inner = self.inner.write();
        let room = inner
            .rooms
            .get_mut(&id)
            .ok_or_else(|| ProviderError::not_found("set_room_status", "room", id))?;
        room.status = status;
        Ok(())
    }

    async fn mark_posted(&self, id: i64, date: NaiveDate) -> ProviderResult<()> {
        if self.fail_mark_posted.write().remove(&id) {
            return Err(ProviderError::upstream("mark_posted", "injected failure"));
        }

        let mut inner = self.inner.write();
        let stay = inner
            .stays
            .get_mut(&id)
            .ok_or_else(|| ProviderError::not_found("mark_posted", "stay", id))?;
        if stay.is_posted {
            return Err(ProviderError::conflict(
                "mark_posted",
                format!("stay {} already posted", id),
            ));
        }
        stay.is_posted = true;
        stay.posted_date = Some(date);
        Ok(())
    }

    async fn unmark_posted(&self, id: i64) -> ProviderResult<()> {
        let mut inner = self.inner.write();
        let stay = inner
            .stays
            .get_mut(&id)
            .ok_or_else(|| ProviderError::not_found("unmark_posted", "stay", id))?;
        stay.is_posted = false;
        stay.posted_date = None;
        Ok(())
    }

    async fn record_checkout(&self, record: &CheckoutRecord) -> ProviderResult<()> {
        let mut inner = self.inner.write();
        if !inner.stays.contains_key(&record.stay_id) {
            return Err(ProviderError::not_found(
                "record_checkout",
                "stay",
                record.stay_id,
            ));
        }
        inner.checkouts.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MemoryProviders {
    async fn payments_for_stay(&self, stay_id: i64) -> ProviderResult<Vec<Payment>> {
        Ok(self
            .inner
            .read()
            .payments
            .iter()
            .filter(|p| p.stay_id == stay_id)
            .cloned()
            .collect())
    }

    async fn record_payment(&self, create: &PaymentCreate) -> ProviderResult<Payment> {
        if create.amount <= 0.0 || !create.amount.is_finite() {
            return Err(ProviderError::validation(
                "record_payment",
                format!("amount must be positive, got {}", create.amount),
            ));
        }

        let payment = Payment {
            id: self.alloc_id(),
            stay_id: create.stay_id,
            amount: create.amount,
            method: create.method,
            status: PaymentStatus::Completed,
            is_deposit: create.is_deposit,
            reference: create.reference.clone(),
            notes: create.notes.clone(),
            recorded_at: Utc::now(),
        };
        self.inner.write().payments.push(payment.clone());
        Ok(payment)
    }

    async fn record_refund(&self, create: &PaymentCreate) -> ProviderResult<Payment> {
        if create.amount <= 0.0 || !create.amount.is_finite() {
            return Err(ProviderError::validation(
                "record_refund",
                format!("amount must be positive, got {}", create.amount),
            ));
        }

        let mut inner = self.inner.write();

        // 服务端幂等约束：同一预订的押金只能退一次
        if create.is_deposit
            && inner.payments.iter().any(|p| {
                p.stay_id == create.stay_id
                    && p.is_deposit
                    && p.status == PaymentStatus::Refunded
            })
        {
            return Err(ProviderError::conflict(
                "record_refund",
                format!("deposit for stay {} already refunded", create.stay_id),
            ));
        }

        let payment = Payment {
            id: self.alloc_id(),
            stay_id: create.stay_id,
            amount: create.amount,
            method: create.method,
            status: PaymentStatus::Refunded,
            is_deposit: create.is_deposit,
            reference: create.reference.clone(),
            notes: create.notes.clone(),
            recorded_at: Utc::now(),
        };
        inner.payments.push(payment.clone());
        Ok(payment)
    }
}

#[async_trait]
impl CompanyLedgerProvider for MemoryProviders {
    async fn create_entry(
        &self,
        create: &CompanyLedgerEntryCreate,
    ) -> ProviderResult<CompanyLedgerEntry> {
        if self.fail_company_ledger.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::upstream(
                "create_ledger_entry",
                "injected failure",
            ));
        }

        let entry = CompanyLedgerEntry {
            id: self.alloc_id(),
            company_id: create.company_id,
            stay_id: create.stay_id,
            description: create.description.clone(),
            amount: create.amount,
            posting_date: create.posting_date,
            reference: create.reference.clone(),
            created_at: Utc::now(),
        };
        self.inner.write().ledger.push(entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl NightAuditProvider for MemoryProviders {
    async fn create_run(&self, draft: &NightAuditRunDraft) -> ProviderResult<NightAuditRun> {
        if self.fail_create_run.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::upstream(
                "create_audit_run",
                "injected failure",
            ));
        }

        let mut inner = self.inner.write();

        // 服务端唯一约束：每个 audit_date 至多一条记录
        if inner.runs.iter().any(|r| r.audit_date == draft.audit_date) {
            return Err(ProviderError::conflict(
                "create_audit_run",
                format!("night audit already run for {}", draft.audit_date),
            ));
        }

        let run = NightAuditRun {
            id: self.alloc_id(),
            audit_date: draft.audit_date,
            run_at: Utc::now(),
            run_by: draft.run_by.clone(),
            total_bookings_posted: draft.total_bookings_posted,
            total_checkins: draft.total_checkins,
            total_checkouts: draft.total_checkouts,
            total_revenue: draft.total_revenue,
            occupancy_rate: draft.occupancy_rate,
            rooms: draft.rooms,
            notes: draft.notes.clone(),
            payment_method_breakdown: draft.payment_method_breakdown.clone(),
            channel_breakdown: draft.channel_breakdown.clone(),
        };
        inner.runs.push(run.clone());
        Ok(run)
    }

    async fn find_run(&self, date: NaiveDate) -> ProviderResult<Option<NightAuditRun>> {
        Ok(self
            .inner
            .read()
            .runs
            .iter()
            .find(|r| r.audit_date == date)
            .cloned())
    }

    async fn list_runs(&self, limit: i64, offset: i64) -> ProviderResult<Vec<NightAuditRun>> {
        let inner = self.inner.read();
        let mut runs = inner.runs.clone();
        runs.sort_by(|a, b| b.audit_date.cmp(&a.audit_date));
        Ok(runs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn run_by_id(&self, id: i64) -> ProviderResult<NightAuditRun> {
        self.inner
            .read()
            .runs
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("audit_run_by_id", "night_audit", id))
    }
}
