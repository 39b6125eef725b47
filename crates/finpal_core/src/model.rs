use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::period::{Entry, ReferenceMonth};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown transaction type {0:?}, expected one of expense, income or investment")]
    TxType(String),
    #[error("invalid month {0:?}, expected YYYY-MM")]
    Month(String),
}

/// Direction of money flow. Amounts are always positive; the type alone
/// decides whether a record adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Expense,
    Income,
    Investment,
}

impl TxType {
    pub const ALL: [TxType; 3] = [TxType::Expense, TxType::Income, TxType::Investment];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Expense => "expense",
            TxType::Income => "income",
            TxType::Investment => "investment",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TxType::Expense),
            "income" => Ok(TxType::Income),
            "investment" => Ok(TxType::Investment),
            _ => Err(ParseError::TxType(s.to_string())),
        }
    }
}

/// A completed financial event as returned by the remote API.
///
/// The dashboard listing of the API omits the bookkeeping fields, so those are
/// optional here. Keys are accepted in both camelCase and snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub amount: Decimal,
    pub description: String,
    #[serde(default, alias = "category_id", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub date: DateTime<Utc>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entry for Transaction {
    fn amount(&self) -> Decimal {
        self.amount
    }

    fn kind(&self) -> TxType {
        self.kind
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// A budgeted transaction, optionally repeating every month until `end_month`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProjectionRecord")]
pub struct Projection {
    pub id: i64,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub end_month: Option<ReferenceMonth>,
}

impl Projection {
    /// Reports whether the projection contributes to `month`, judging the
    /// projection's own date in `tz`. An open-ended recurring projection
    /// occurs in every month from its start onwards.
    pub fn occurs_in<Tz: TimeZone>(&self, month: ReferenceMonth, tz: &Tz) -> bool {
        let start = ReferenceMonth::of(&self.date.with_timezone(tz));
        if !self.is_recurring {
            return start == month;
        }

        start <= month && self.end_month.map_or(true, |end| month <= end)
    }
}

impl Entry for Projection {
    fn amount(&self) -> Decimal {
        self.amount
    }

    fn kind(&self) -> TxType {
        self.kind
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionRecord {
    id: i64,
    amount: Decimal,
    category: String,
    description: String,
    #[serde(rename = "type")]
    kind: TxType,
    date: DateTime<Utc>,
    #[serde(default, alias = "is_recurring")]
    is_recurring: bool,
    #[serde(default, alias = "end_month")]
    end_month: Option<ReferenceMonth>,
}

impl From<ProjectionRecord> for Projection {
    fn from(record: ProjectionRecord) -> Self {
        Self {
            id: record.id,
            amount: record.amount,
            category: record.category,
            description: record.description,
            kind: record.kind,
            date: record.date,
            is_recurring: record.is_recurring,
            // A one-off projection never carries an end month.
            end_month: record.end_month.filter(|_| record.is_recurring),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TxType>,
}
