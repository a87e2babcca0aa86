//! Premium calculator
//!
//! Pure mapping from resolved upstream values to a [`PremiumBreakdown`]:
//!
//! ```text
//! final = base * age_factor * risk_factor * region_multiplier + add_ons
//! ```
//!
//! All arithmetic is exact decimal arithmetic. Monetary values are rounded to
//! cents only when the breakdown is produced.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::entities::{CoverageRecord, PremiumBreakdown};
use crate::error::CalculationError;

const MONEY_SCALE: u32 = 2;

/// Age factor: 1.0 under 30, 1.2 from 30 to 49, 1.5 from 50
pub fn age_factor(age: i64) -> Decimal {
    match age {
        ..=29 => Decimal::new(10, 1),
        30..=49 => Decimal::new(12, 1),
        _ => Decimal::new(15, 1),
    }
}

/// Risk factor: 1.0 plus 0.1 for smokers plus 0.2 for a pre-existing illness
pub fn risk_factor(smoker: bool, has_illness: bool) -> Decimal {
    let mut factor = Decimal::new(10, 1);
    if smoker {
        factor += Decimal::new(1, 1);
    }
    if has_illness {
        factor += Decimal::new(2, 1);
    }
    factor
}

/// Sum of the cost of every selected coverage
pub fn add_ons_total<'a>(
    coverages: impl IntoIterator<Item = &'a CoverageRecord>,
) -> Result<Decimal, CalculationError> {
    coverages
        .into_iter()
        .try_fold(Decimal::ZERO, |total, coverage| {
            if coverage.cost < Decimal::ZERO {
                return Err(CalculationError::InvalidInput {
                    field: "cost",
                    reason: format!("coverage {} has negative cost {}", coverage.id, coverage.cost),
                });
            }
            total.checked_add(coverage.cost).ok_or_else(|| overflow("cost"))
        })
}

/// Compute the full breakdown
///
/// Rejects inputs that can only come from a corrupt upstream record.
pub fn compute(
    base_premium: Decimal,
    age: i64,
    smoker: bool,
    has_illness: bool,
    region_multiplier: Decimal,
    add_ons_total: Decimal,
) -> Result<PremiumBreakdown, CalculationError> {
    if base_premium < Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field: "base_premium",
            reason: format!("must not be negative, got {}", base_premium),
        });
    }
    if region_multiplier <= Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field: "multiplier",
            reason: format!("must be positive, got {}", region_multiplier),
        });
    }
    if age < 0 {
        return Err(CalculationError::InvalidInput {
            field: "age",
            reason: format!("must not be negative, got {}", age),
        });
    }
    if add_ons_total < Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field: "cost",
            reason: format!("add-on total must not be negative, got {}", add_ons_total),
        });
    }

    let age_factor = age_factor(age);
    let risk_factor = risk_factor(smoker, has_illness);

    let adjusted = base_premium
        .checked_mul(age_factor)
        .and_then(|v| v.checked_mul(risk_factor))
        .and_then(|v| v.checked_mul(region_multiplier))
        .ok_or_else(|| overflow("base_premium"))?;
    let final_premium = adjusted
        .checked_add(add_ons_total)
        .ok_or_else(|| overflow("cost"))?;

    // Factors carry no fixed scale: "1.10" from the region store renders as "1.1"
    Ok(PremiumBreakdown {
        base_premium: round_money(base_premium),
        age_factor: age_factor.normalize(),
        risk_factor: risk_factor.normalize(),
        region_factor: region_multiplier.normalize(),
        add_ons_total: round_money(add_ons_total),
        final_premium: round_money(final_premium),
    })
}

fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    // Pad so "1000" renders as "1000.00"
    rounded.rescale(MONEY_SCALE);
    rounded
}

fn overflow(field: &'static str) -> CalculationError {
    CalculationError::InvalidInput {
        field,
        reason: "value exceeds the supported decimal range".to_string(),
    }
}
