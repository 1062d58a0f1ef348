//! Tariff calculation
//!
//! Derives the tax-exclusive room charge, service tax, tourism tax, extra-bed
//! charge and deposit requirement for a stay. Pure function of
//! (Stay, Room, HotelSettings, penalty): settings are injected, never read
//! from process-wide state, so every rule is testable in isolation.
//!
//! Nightly rates are stored **tax-inclusive**. The service tax is backed out
//! of the gross subtotal rather than added on top:
//!
//! ```text
//! room_charge = gross / (1 + rate/100)
//! service_tax = gross - room_charge
//! ```
//!
//! computing the charge first avoids rounding drift, so charge + tax always
//! reconstructs the gross subtotal exactly.

use rust_decimal::Decimal;

use shared::models::{ChargeBreakdown, HotelSettings, Membership, Room, Stay, TouristClass};

use crate::billing::money::{to_decimal, to_money, validate_penalty};
use crate::billing::{BillingError, BillingResult};

pub struct TariffCalculator<'a> {
    settings: &'a HotelSettings,
}

impl<'a> TariffCalculator<'a> {
    pub fn new(settings: &'a HotelSettings) -> Self {
        Self { settings }
    }

    /// Number of nights; zero or negative spans are an input error
    pub fn nights(stay: &Stay) -> BillingResult<i64> {
        let nights = stay.nights();
        if nights <= 0 {
            return Err(BillingError::InvalidStayDates { nights });
        }
        Ok(nights)
    }

    /// Resolve the tax-inclusive nightly rate
    ///
    /// Fallback chain when the stored rate is absent or zero:
    /// stay rate → room list price → stay total ÷ nights. Each fallback is a
    /// degraded-input condition and is logged; all three exhausted is an
    /// input error, never a silent zero charge.
    fn resolve_nightly_rate(stay: &Stay, room: &Room, nights: i64) -> BillingResult<Decimal> {
        if stay.nightly_rate > 0.0 {
            return Ok(to_decimal(stay.nightly_rate));
        }

        if room.list_price > 0.0 {
            tracing::warn!(
                stay_id = stay.id,
                room_id = room.id,
                list_price = room.list_price,
                "stay has no nightly rate; falling back to room list price"
            );
            return Ok(to_decimal(room.list_price));
        }

        if stay.total_amount > 0.0 {
            tracing::warn!(
                stay_id = stay.id,
                total_amount = stay.total_amount,
                "stay has no nightly rate or list price; deriving rate from total amount"
            );
            return Ok(to_decimal(stay.total_amount) / Decimal::from(nights));
        }

        Err(BillingError::MissingRate { stay_id: stay.id })
    }

    /// Compute the ChargeBreakdown for a stay
    ///
    /// `penalty` is the late-checkout penalty layered on by the checkout
    /// flow; pass 0 for a plain preview. The deposit never contributes to
    /// the grand total; it settles separately.
    pub fn breakdown(
        &self,
        stay: &Stay,
        room: &Room,
        penalty: f64,
    ) -> BillingResult<ChargeBreakdown> {
        validate_penalty(penalty)?;
        let nights = Self::nights(stay)?;
        let rate = Self::resolve_nightly_rate(stay, room, nights)?;

        // Back-calculate the tax-exclusive charge from the gross subtotal
        let room_subtotal = rate * Decimal::from(nights);
        let divisor = Decimal::ONE + to_decimal(self.settings.service_tax_rate) / Decimal::ONE_HUNDRED;
        let room_charge = to_money(room_subtotal / divisor);
        let service_tax = to_money(room_subtotal - to_decimal(room_charge));

        // Tourism tax applies to foreign guests only; a stored positive
        // amount wins over the per-night rate
        let tourism_tax = if stay.tourist_class == TouristClass::Foreign {
            match stay.tourism_tax_amount {
                Some(stored) if stored > 0.0 => to_money(to_decimal(stored)),
                _ => to_money(Decimal::from(nights) * to_decimal(self.settings.tourism_tax_rate)),
            }
        } else {
            0.0
        };

        let extra_bed = stay.extra_bed_charge.unwrap_or(0.0);
        if !extra_bed.is_finite() || extra_bed < 0.0 {
            return Err(BillingError::InvalidOperation(format!(
                "extra bed charge must be non-negative, got {}",
                extra_bed
            )));
        }
        let extra_bed_charge = to_money(to_decimal(extra_bed));

        // Members and company-billed stays are exempt from the room-card deposit
        let deposit_required =
            if stay.membership == Membership::Member || stay.is_company_billed() {
                0.0
            } else {
                to_money(to_decimal(self.settings.room_card_deposit))
            };

        let late_checkout_penalty = to_money(to_decimal(penalty));

        let subtotal = to_money(
            to_decimal(room_charge)
                + to_decimal(service_tax)
                + to_decimal(tourism_tax)
                + to_decimal(extra_bed_charge)
                + to_decimal(late_checkout_penalty),
        );

        Ok(ChargeBreakdown {
            room_charge,
            service_tax,
            tourism_tax,
            extra_bed_charge,
            late_checkout_penalty,
            subtotal,
            deposit_required,
            deposit_refund: deposit_required,
            grand_total: subtotal,
        })
    }
}
