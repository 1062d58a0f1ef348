//! Night audit poster
//!
//! `preview` is pure read; `run` is the only writer and is all-or-nothing:
//! either every eligible stay is marked posted and the run record exists, or
//! stays already marked are unmarked again and the error propagates. The
//! original system pushed this batch into one database function; a client of
//! a remote API cannot, so it compensates instead.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use shared::models::{
    NightAuditDetail, NightAuditPreview, NightAuditRun, NightAuditRunDraft, PostedStayDetail,
    RevenueBreakdownItem, Room, RoomStatus, RoomStatusSnapshot, Stay, StayStatus, UnpostedStay,
};

use crate::billing::money::{to_decimal, to_money};
use crate::night_audit::{AuditError, AuditResult};
use crate::providers::Providers;

/// End-of-day posting service
#[derive(Clone)]
pub struct NightAuditPoster {
    providers: Providers,
}

impl NightAuditPoster {
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    /// Reject dates the hotel has not reached yet
    fn validate_date(date: NaiveDate) -> AuditResult<()> {
        let today = Utc::now().date_naive();
        if date > today {
            return Err(AuditError::InvalidDate(format!(
                "cannot run night audit for future date {}",
                date
            )));
        }
        Ok(())
    }

    /// Revenue is recognized for stays that actually occupied the room
    fn counts_revenue(stay: &Stay) -> bool {
        matches!(stay.status, StayStatus::CheckedIn | StayStatus::CheckedOut)
    }

    /// Aggregate revenue by payment method and booking channel
    fn revenue_breakdowns(
        stays: &[Stay],
    ) -> (Vec<RevenueBreakdownItem>, Vec<RevenueBreakdownItem>, f64) {
        let mut by_method: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        let mut by_channel: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        let mut revenue = Decimal::ZERO;

        for stay in stays.iter().filter(|s| Self::counts_revenue(s)) {
            let amount = to_decimal(stay.total_amount);
            revenue += amount;

            let method = stay
                .payment_method
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            let entry = by_method.entry(method).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += amount;

            let channel = stay.source.clone().unwrap_or_else(|| "unknown".to_string());
            let entry = by_channel.entry(channel).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += amount;
        }

        let collect = |map: BTreeMap<String, (i64, Decimal)>| {
            map.into_iter()
                .map(|(category, (count, amount))| RevenueBreakdownItem {
                    category,
                    count,
                    amount: to_money(amount),
                })
                .collect()
        };

        (collect(by_method), collect(by_channel), to_money(revenue))
    }

    fn snapshot_rooms(rooms: &[Room]) -> RoomStatusSnapshot {
        let mut snapshot = RoomStatusSnapshot {
            total: rooms.len() as i64,
            ..Default::default()
        };
        for room in rooms {
            match room.status {
                RoomStatus::Available => snapshot.available += 1,
                RoomStatus::Occupied => snapshot.occupied += 1,
                RoomStatus::Reserved => snapshot.reserved += 1,
                RoomStatus::Maintenance => snapshot.maintenance += 1,
                RoomStatus::Dirty => snapshot.dirty += 1,
            }
        }
        snapshot
    }

    fn occupancy_rate(snapshot: &RoomStatusSnapshot) -> f64 {
        if snapshot.total == 0 {
            return 0.0;
        }
        to_money(
            Decimal::from(snapshot.occupied) * Decimal::ONE_HUNDRED
                / Decimal::from(snapshot.total),
        )
    }

    /// What a run for `date` would post. Pure read, safe to call repeatedly.
    pub async fn preview(&self, date: NaiveDate) -> AuditResult<NightAuditPreview> {
        let already_run = self.providers.night_audit.find_run(date).await?.is_some();
        let unposted = self.providers.stays.unposted_stays(date).await?;
        let rooms = self.providers.stays.rooms().await?;

        let (payment_method_breakdown, channel_breakdown, estimated_revenue) =
            Self::revenue_breakdowns(&unposted);

        let lines: Vec<UnpostedStay> = unposted
            .iter()
            .map(|s| UnpostedStay {
                stay_id: s.id,
                stay_number: s.stay_number.clone(),
                guest_name: s.guest_name.clone(),
                room_number: s.room_number.clone(),
                check_in_date: s.check_in_date,
                check_out_date: s.check_out_date,
                status: s.status.to_string(),
                total_amount: s.total_amount,
                payment_method: s.payment_method.clone(),
                source: s.source.clone(),
            })
            .collect();

        Ok(NightAuditPreview {
            audit_date: date,
            can_run: !already_run,
            already_run,
            total_unposted: lines.len() as i64,
            unposted: lines,
            estimated_revenue,
            rooms: Self::snapshot_rooms(&rooms),
            payment_method_breakdown,
            channel_breakdown,
        })
    }

    /// Post the day
    ///
    /// Steps:
    /// 1. duplicate-run guard (plus the provider-side uniqueness constraint)
    /// 2. room-status snapshot
    /// 3. mark every eligible stay posted, accumulating counts and revenue
    /// 4. create the immutable run record
    ///
    /// A failure in step 3 or 4 unwinds the marks already made before the
    /// error propagates; no partial run survives. Zero eligible stays is
    /// still a successful run recording the snapshot.
    pub async fn run(
        &self,
        date: NaiveDate,
        notes: Option<String>,
        run_by: Option<String>,
    ) -> AuditResult<NightAuditRun> {
        Self::validate_date(date)?;

        // 1. Duplicate-run guard
        if self.providers.night_audit.find_run(date).await?.is_some() {
            return Err(AuditError::AlreadyRun { date });
        }

        // 2. Snapshot current room state
        let rooms = self.providers.stays.rooms().await?;
        let snapshot = Self::snapshot_rooms(&rooms);

        // 3. Lock each eligible stay
        let unposted = self.providers.stays.unposted_stays(date).await?;
        let mut marked: Vec<i64> = Vec::with_capacity(unposted.len());
        for stay in &unposted {
            if let Err(e) = self.providers.stays.mark_posted(stay.id, date).await {
                tracing::error!(
                    audit_date = %date,
                    stay_id = stay.id,
                    error = %e,
                    "night audit posting failed, unwinding"
                );
                self.unwind(&marked).await;
                return Err(AuditError::RunAborted {
                    date,
                    reason: e.to_string(),
                });
            }
            marked.push(stay.id);
        }

        let total_checkins = unposted
            .iter()
            .filter(|s| s.check_in_date == date)
            .count() as i64;
        let total_checkouts = unposted
            .iter()
            .filter(|s| s.status == StayStatus::CheckedOut && s.check_out_date == date)
            .count() as i64;
        let (payment_method_breakdown, channel_breakdown, total_revenue) =
            Self::revenue_breakdowns(&unposted);

        // 4. One immutable record for the date
        let draft = NightAuditRunDraft {
            audit_date: date,
            run_by,
            total_bookings_posted: marked.len() as i64,
            total_checkins,
            total_checkouts,
            total_revenue,
            occupancy_rate: Self::occupancy_rate(&snapshot),
            rooms: snapshot,
            notes,
            payment_method_breakdown,
            channel_breakdown,
        };

        match self.providers.night_audit.create_run(&draft).await {
            Ok(run) => {
                tracing::info!(
                    audit_date = %date,
                    bookings_posted = run.total_bookings_posted,
                    revenue = run.total_revenue,
                    "night audit completed"
                );
                Ok(run)
            }
            Err(e) => {
                tracing::error!(
                    audit_date = %date,
                    error = %e,
                    "night audit run creation failed, unwinding"
                );
                self.unwind(&marked).await;
                if e.is_conflict() {
                    // Another operator won the race; their run stands
                    Err(AuditError::AlreadyRun { date })
                } else {
                    Err(AuditError::RunAborted {
                        date,
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    /// Compensating unmark; a failure here is logged, not propagated
    async fn unwind(&self, marked: &[i64]) {
        for &stay_id in marked.iter().rev() {
            if let Err(e) = self.providers.stays.unmark_posted(stay_id).await {
                tracing::error!(
                    stay_id,
                    error = %e,
                    "failed to unwind night audit posting; stay left locked"
                );
            }
        }
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AuditResult<Vec<NightAuditRun>> {
        Ok(self.providers.night_audit.list_runs(limit, offset).await?)
    }

    /// Full run detail including the stays it locked, for reporting/export
    pub async fn detail(&self, id: i64) -> AuditResult<NightAuditDetail> {
        let run = self.providers.night_audit.run_by_id(id).await?;
        let posted = self.providers.stays.posted_stays(run.audit_date).await?;

        let posted_stays = posted
            .iter()
            .map(|s| PostedStayDetail {
                stay_id: s.id,
                stay_number: s.stay_number.clone(),
                guest_name: s.guest_name.clone(),
                room_number: s.room_number.clone(),
                check_in_date: s.check_in_date,
                check_out_date: s.check_out_date,
                nights: s.nights(),
                status: s.status.to_string(),
                total_amount: s.total_amount,
                payment_method: s.payment_method.clone(),
                source: s.source.clone(),
            })
            .collect();

        Ok(NightAuditDetail { run, posted_stays })
    }
}
