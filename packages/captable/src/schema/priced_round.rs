//! Priced equity rounds (Series A, B, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{each, finite, non_empty, optional_percentage, positive_amount};
use crate::error::{SchemaResult, SchemaViolation};

/// Participating preferred terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRights {
    /// Liquidation preference multiple, e.g. 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,

    /// Participation cap as a multiple of the investment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
}

/// A priced-round investor as extracted.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInvestorCandidate {
    /// Name of the investor
    pub investor_name: String,

    /// Amount invested in this round, in dollars
    pub investment_amount: f64,

    /// Whether the investor holds pro-rata rights
    pub pro_rata_rights: Option<bool>,

    /// Participation terms, if any
    pub participation_rights: Option<ParticipationRights>,
}

/// A validated priced-round investor. `investmentAmount > 0` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SeriesInvestorCandidate")]
pub struct SeriesInvestor {
    investor_name: String,
    investment_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pro_rata_rights: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    participation_rights: Option<ParticipationRights>,
}

impl SeriesInvestor {
    pub fn investor_name(&self) -> &str {
        &self.investor_name
    }

    pub fn investment_amount(&self) -> f64 {
        self.investment_amount
    }

    pub fn pro_rata_rights(&self) -> Option<bool> {
        self.pro_rata_rights
    }

    pub fn participation_rights(&self) -> Option<&ParticipationRights> {
        self.participation_rights.as_ref()
    }
}

impl TryFrom<SeriesInvestorCandidate> for SeriesInvestor {
    type Error = SchemaViolation;

    fn try_from(candidate: SeriesInvestorCandidate) -> SchemaResult<Self> {
        Ok(Self {
            investor_name: non_empty("investorName", candidate.investor_name)?,
            investment_amount: positive_amount("investmentAmount", candidate.investment_amount)?,
            pro_rata_rights: candidate.pro_rata_rights,
            participation_rights: candidate.participation_rights,
        })
    }
}

/// A priced round as extracted.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedRoundCandidate {
    /// Round name, e.g. "Series A"
    pub round_name: String,

    /// Every investor participating in the round
    pub investors: Vec<SeriesInvestorCandidate>,

    /// Pre-money valuation in dollars
    pub pre_money_valuation: f64,

    /// Target option pool refresh as a post-money percentage (0-100)
    pub target_options_pool: Option<f64>,

    /// Closing date (calendar date)
    pub date_completed: Option<String>,

    /// Board seats granted in the round
    pub board_seats: Option<Vec<String>>,
}

/// A validated priced round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PricedRoundCandidate")]
pub struct PricedRound {
    round_name: String,
    investors: Vec<SeriesInvestor>,
    pre_money_valuation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_options_pool: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_completed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    board_seats: Option<Vec<String>>,
}

impl PricedRound {
    pub fn round_name(&self) -> &str {
        &self.round_name
    }

    pub fn investors(&self) -> &[SeriesInvestor] {
        &self.investors
    }

    pub fn pre_money_valuation(&self) -> f64 {
        self.pre_money_valuation
    }

    pub fn target_options_pool(&self) -> Option<f64> {
        self.target_options_pool
    }

    pub fn date_completed(&self) -> Option<&str> {
        self.date_completed.as_deref()
    }

    pub fn board_seats(&self) -> Option<&[String]> {
        self.board_seats.as_deref()
    }

    /// Total raised across every investor in the round.
    pub fn total_investment(&self) -> f64 {
        self.investors.iter().map(SeriesInvestor::investment_amount).sum()
    }
}

impl TryFrom<PricedRoundCandidate> for PricedRound {
    type Error = SchemaViolation;

    fn try_from(candidate: PricedRoundCandidate) -> SchemaResult<Self> {
        Ok(Self {
            round_name: non_empty("roundName", candidate.round_name)?,
            investors: each("investors", candidate.investors, SeriesInvestor::try_from)?,
            pre_money_valuation: finite("preMoneyValuation", candidate.pre_money_valuation)?,
            target_options_pool: optional_percentage(
                "targetOptionsPool",
                candidate.target_options_pool,
            )?,
            date_completed: candidate.date_completed,
            board_seats: candidate.board_seats,
        })
    }
}
