//! Pure classification rules for cassettes and terminals.

use geocash_model::{CassetteStatus, EfficiencyStatus};

pub const DISPENSE_CAPACITY: f64 = 20_000_000.0;
pub const DEPOSIT_CAPACITY: f64 = 10_000_000.0;

/// Dispense cassettes below this amount are reported as `Low`.
pub const LOW_DISPENSE_THRESHOLD: f64 = 2_000_000.0;
/// Deposit cassettes above this amount are reported as `Full`.
pub const FULL_DEPOSIT_THRESHOLD: f64 = 9_000_000.0;

pub const MAX_DOWNTIME_FRACTION: f64 = 0.10;
pub const EFFECTIVE_MIN_FREQUENCY: u32 = 300;
pub const EFFECTIVE_MAX_DOWNTIME: f64 = 0.03;

/// A dispense cassette is never `Full`.
pub fn dispense_status(amount: f64) -> CassetteStatus {
    if amount <= 0.0 {
        CassetteStatus::Empty
    } else if amount < LOW_DISPENSE_THRESHOLD {
        CassetteStatus::Low
    } else {
        CassetteStatus::Ok
    }
}

/// A deposit cassette is never `Low` or `Empty`.
pub fn deposit_status(amount: f64) -> CassetteStatus {
    if amount > FULL_DEPOSIT_THRESHOLD {
        CassetteStatus::Full
    } else {
        CassetteStatus::Ok
    }
}

/// Total over every input: the `Ineffective` checks win over `Effective`.
pub fn classify_efficiency(
    dispense: CassetteStatus,
    deposit: CassetteStatus,
    withdrawals_per_day: u32,
    downtime_fraction: f64,
) -> EfficiencyStatus {
    if dispense == CassetteStatus::Empty
        || deposit == CassetteStatus::Full
        || downtime_fraction > MAX_DOWNTIME_FRACTION
    {
        EfficiencyStatus::Ineffective
    } else if withdrawals_per_day > EFFECTIVE_MIN_FREQUENCY
        && downtime_fraction < EFFECTIVE_MAX_DOWNTIME
    {
        EfficiencyStatus::Effective
    } else {
        EfficiencyStatus::Normal
    }
}
