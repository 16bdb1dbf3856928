use std::fmt::{self, Display};

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::poi::{PointOfInterest, TerminalId};

/// Which way cash moves through a cassette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CassetteKind {
    /// Cash-out: notes handed to customers.
    Dispense,
    /// Cash-in: notes accepted from customers.
    Deposit,
}

/// Fill state derived from a cassette's current amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CassetteStatus {
    #[cfg_attr(feature = "serde", serde(rename = "OK"))]
    Ok,
    Low,
    Empty,
    Full,
}

impl Display for CassetteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CassetteStatus::Ok => write!(f, "OK"),
            CassetteStatus::Low => write!(f, "Low"),
            CassetteStatus::Empty => write!(f, "Empty"),
            CassetteStatus::Full => write!(f, "Full"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Cassette {
    pub kind: CassetteKind,
    pub current_amount: f64,
    pub capacity: f64,
    pub status: CassetteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComplaintCategory {
    Technical,
    Cleanliness,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComplaintStatus {
    Open,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Complaint {
    pub id: u32,
    pub category: ComplaintCategory,
    pub text: String,
    pub status: ComplaintStatus,
    pub date: NaiveDate,
}

/// Operational verdict for an own-network terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EfficiencyStatus {
    Effective,
    Normal,
    Ineffective,
}

impl Display for EfficiencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EfficiencyStatus::Effective => write!(f, "Effective"),
            EfficiencyStatus::Normal => write!(f, "Normal"),
            EfficiencyStatus::Ineffective => write!(f, "Ineffective"),
        }
    }
}

/// A cash machine on the map.
///
/// Own-network terminals carry the full operational detail (two cassettes,
/// complaints, efficiency verdict and balance figures). Competitors only
/// carry the estimated flow fields; their cassette and complaint lists stay
/// empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Terminal {
    pub id: TerminalId,
    pub name: String,
    pub bank: String,
    pub position: GeoPoint,
    pub is_own_network: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub cassettes: Vec<Cassette>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub complaints: Vec<Complaint>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub efficiency_status: Option<EfficiencyStatus>,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub total_cash: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub average_cash_balance: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub withdrawal_frequency_per_day: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub downtime_fraction: Option<f64>,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub estimated_withdrawal_flow: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub estimated_deposit_flow: Option<f64>,
}

impl Terminal {
    /// A terminal with identity and position only; every detail field empty.
    pub fn bare(
        id: TerminalId,
        name: impl Into<String>,
        bank: impl Into<String>,
        position: GeoPoint,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            bank: bank.into(),
            position,
            is_own_network: false,
            cassettes: Vec::new(),
            complaints: Vec::new(),
            efficiency_status: None,
            total_cash: None,
            average_cash_balance: None,
            withdrawal_frequency_per_day: None,
            downtime_fraction: None,
            estimated_withdrawal_flow: None,
            estimated_deposit_flow: None,
        }
    }

    pub fn cassette(&self, kind: CassetteKind) -> Option<&Cassette> {
        self.cassettes.iter().find(|c| c.kind == kind)
    }

    /// Checks the shape invariants that tie `is_own_network` to which detail
    /// fields are populated.
    pub fn has_consistent_detail(&self) -> bool {
        if self.is_own_network {
            self.cassettes.len() == 2
                && self.cassette(CassetteKind::Dispense).is_some()
                && self.cassette(CassetteKind::Deposit).is_some()
                && self.efficiency_status.is_some()
        } else {
            self.cassettes.is_empty()
                && self.complaints.is_empty()
                && self.efficiency_status.is_none()
        }
    }
}

impl From<PointOfInterest> for Terminal {
    fn from(poi: PointOfInterest) -> Self {
        Terminal::bare(poi.id, poi.name, poi.bank, poi.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn own_network_terminal() -> Terminal {
        let mut terminal = Terminal::bare(
            TerminalId(1),
            "Forte ATM",
            "Forte Bank",
            GeoPoint::new(51.1, 71.4),
        );
        terminal.is_own_network = true;
        terminal.cassettes = vec![
            Cassette {
                kind: CassetteKind::Dispense,
                current_amount: 1.0,
                capacity: 2.0,
                status: CassetteStatus::Ok,
            },
            Cassette {
                kind: CassetteKind::Deposit,
                current_amount: 0.0,
                capacity: 1.0,
                status: CassetteStatus::Ok,
            },
        ];
        terminal.efficiency_status = Some(EfficiencyStatus::Normal);
        terminal
    }

    #[test]
    fn bare_terminal_is_a_consistent_competitor() {
        let terminal = Terminal::bare(
            TerminalId(7),
            "Kaspi ATM",
            "Kaspi",
            GeoPoint::default(),
        );
        assert!(!terminal.is_own_network);
        assert!(terminal.has_consistent_detail());
    }

    #[test]
    fn own_network_requires_both_cassettes_and_verdict() {
        let terminal = own_network_terminal();
        assert!(terminal.has_consistent_detail());

        let mut missing_verdict = terminal.clone();
        missing_verdict.efficiency_status = None;
        assert!(!missing_verdict.has_consistent_detail());

        let mut one_cassette = terminal;
        one_cassette.cassettes.pop();
        assert!(!one_cassette.has_consistent_detail());
    }
}
