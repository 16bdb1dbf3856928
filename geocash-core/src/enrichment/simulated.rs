use chrono::{Days, NaiveDate, Utc};
use geocash_model::{
    Complaint, ComplaintCategory, ComplaintStatus, GeoPoint, Terminal,
    TerminalId,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::Enricher;
use super::fallback::FallbackSettings;
use super::profile::OperationalProfile;
use super::status::{DEPOSIT_CAPACITY, DISPENSE_CAPACITY};

/// Share of terminals drawn without any complaint.
const NO_COMPLAINT_PROBABILITY: f64 = 0.7;
const MAX_COMPLAINT_ID: u32 = 99_999;
const COMPLAINT_AGE_DAYS: u64 = 10;

const COMPLAINT_CATALOG: &[(ComplaintCategory, &str)] = &[
    (ComplaintCategory::Technical, "Card retained by the machine"),
    (ComplaintCategory::Technical, "Receipt was not printed"),
    (ComplaintCategory::Technical, "Screen does not respond to touch"),
    (ComplaintCategory::Cleanliness, "Dirty keypad"),
    (ComplaintCategory::Cleanliness, "Litter near the terminal"),
    (ComplaintCategory::Service, "Slow request processing"),
    (ComplaintCategory::Service, "Out of small notes"),
];

const UNKNOWN_BANK: &str = "Unknown";

/// Random-number driven [`Enricher`].
///
/// The generator sits behind a mutex so one instance can be shared between
/// the refresh task and request handlers. Seed it for reproducible output.
#[derive(Debug)]
pub struct SimulatedEnricher {
    rng: Mutex<StdRng>,
    display_name: String,
    fallback: FallbackSettings,
}

impl SimulatedEnricher {
    pub fn new(
        display_name: impl Into<String>,
        fallback: FallbackSettings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            display_name: display_name.into(),
            fallback,
        }
    }

    pub fn seeded(
        display_name: impl Into<String>,
        fallback: FallbackSettings,
        seed: u64,
    ) -> Self {
        Self::new(display_name, fallback, Some(seed))
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn fallback(&self) -> &FallbackSettings {
        &self.fallback
    }

    /// Draws the operational data for one own-network terminal. Complaint
    /// dates count back from `today`.
    pub fn draw_profile(&self, today: NaiveDate) -> OperationalProfile {
        let mut rng = self.rng.lock();

        let average_cash_balance =
            5_000_000.0 + rng.random_range(0..20_000_000u32) as f64;
        let withdrawals_per_day = 50 + rng.random_range(0..400u32);
        let downtime_fraction = rng.random::<f64>() * 0.15;
        let dispense_amount =
            rng.random_range(0..DISPENSE_CAPACITY as u32) as f64;
        let deposit_amount = rng.random_range(0..DEPOSIT_CAPACITY as u32) as f64;
        let complaints = draw_complaints(&mut *rng, today);

        OperationalProfile {
            average_cash_balance,
            withdrawals_per_day,
            downtime_fraction,
            dispense_amount,
            deposit_amount,
            complaints,
        }
    }
}

fn draw_complaints<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
) -> Vec<Complaint> {
    if rng.random_bool(NO_COMPLAINT_PROBABILITY) {
        return Vec::new();
    }

    let count = rng.random_range(1..=2);
    let mut complaints = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(&(category, text)) = COMPLAINT_CATALOG.choose(rng) else {
            break;
        };
        let age = rng.random_range(0..COMPLAINT_AGE_DAYS);
        complaints.push(Complaint {
            id: rng.random_range(0..MAX_COMPLAINT_ID),
            category,
            text: text.to_string(),
            status: ComplaintStatus::Open,
            date: today.checked_sub_days(Days::new(age)).unwrap_or(today),
        });
    }
    complaints
}

impl Enricher for SimulatedEnricher {
    fn enrich_own_network(&self, terminal: Terminal) -> Terminal {
        let today = Utc::now().date_naive();
        self.draw_profile(today).apply(terminal, &self.display_name)
    }

    fn generate_fallback_competitors(&self, count: usize) -> Vec<Terminal> {
        let settings = &self.fallback;
        let bounds = settings.bounds;
        let mut rng = self.rng.lock();

        (0..count)
            .map(|i| {
                let bank = settings
                    .banks
                    .choose(&mut *rng)
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_BANK)
                    .to_string();
                let position = GeoPoint::new(
                    bounds.min_lat
                        + rng.random::<f64>() * (bounds.max_lat - bounds.min_lat),
                    bounds.min_lng
                        + rng.random::<f64>() * (bounds.max_lng - bounds.min_lng),
                );
                let withdrawal = draw_amount(
                    &mut *rng,
                    settings.withdrawal_flow.min,
                    settings.withdrawal_flow.max,
                );
                let deposit = draw_amount(
                    &mut *rng,
                    settings.deposit_flow.min,
                    settings.deposit_flow.max,
                );

                let mut terminal = Terminal::bare(
                    TerminalId(settings.first_id + i as i64),
                    format!("{bank} ATM #{i}"),
                    bank,
                    position,
                );
                terminal.estimated_withdrawal_flow = Some(withdrawal);
                terminal.estimated_deposit_flow = Some(deposit);
                terminal
            })
            .collect()
    }
}

/// Whole-unit amount in `[min, max)`; collapses to `min` on an empty range.
fn draw_amount<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        min + rng.random_range(0.0..(max - min)).floor()
    } else {
        min
    }
}
