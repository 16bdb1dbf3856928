use geocash_model::{Cassette, CassetteKind, Complaint, Terminal};

use super::status::{
    DEPOSIT_CAPACITY, DISPENSE_CAPACITY, classify_efficiency, deposit_status,
    dispense_status,
};

/// One random draw of operational data for an own-network terminal.
///
/// Separating the draw from [`OperationalProfile::apply`] lets tests build a
/// profile by hand and force any cassette or efficiency outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationalProfile {
    pub average_cash_balance: f64,
    pub withdrawals_per_day: u32,
    pub downtime_fraction: f64,
    pub dispense_amount: f64,
    pub deposit_amount: f64,
    pub complaints: Vec<Complaint>,
}

impl OperationalProfile {
    /// Stamps the profile onto `terminal`, marking it as own network under
    /// `bank`. Estimated flow fields are competitor-only and get cleared.
    pub fn apply(self, mut terminal: Terminal, bank: &str) -> Terminal {
        let dispense = Cassette {
            kind: CassetteKind::Dispense,
            current_amount: self.dispense_amount,
            capacity: DISPENSE_CAPACITY,
            status: dispense_status(self.dispense_amount),
        };
        let deposit = Cassette {
            kind: CassetteKind::Deposit,
            current_amount: self.deposit_amount,
            capacity: DEPOSIT_CAPACITY,
            status: deposit_status(self.deposit_amount),
        };

        terminal.efficiency_status = Some(classify_efficiency(
            dispense.status,
            deposit.status,
            self.withdrawals_per_day,
            self.downtime_fraction,
        ));
        terminal.is_own_network = true;
        terminal.bank = bank.to_string();
        terminal.total_cash = Some(self.dispense_amount + self.deposit_amount);
        terminal.average_cash_balance = Some(self.average_cash_balance);
        terminal.withdrawal_frequency_per_day = Some(self.withdrawals_per_day);
        terminal.downtime_fraction = Some(self.downtime_fraction);
        terminal.cassettes = vec![dispense, deposit];
        terminal.complaints = self.complaints;
        terminal.estimated_withdrawal_flow = None;
        terminal.estimated_deposit_flow = None;
        terminal
    }
}
