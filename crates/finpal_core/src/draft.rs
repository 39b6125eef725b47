//! Typed form state for new records.
//!
//! A draft holds exactly what the user typed. `validate` is the single gate
//! between that raw input and the payload sent upstream.
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::mask;
use crate::model::TxType;
use crate::period::ReferenceMonth;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} must not be empty")]
    Missing(&'static str),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("invalid category id {0:?}")]
    InvalidCategory(String),
    #[error("invalid date {0:?}, expected DD/MM/YYYY HH:mm")]
    InvalidDate(String),
    #[error("recurring projections need an end month")]
    MissingEndMonth,
    #[error("invalid end month {0:?}, expected YYYY-MM")]
    InvalidEndMonth(String),
    #[error("end month {end} is before the projection starts in {start}")]
    EndBeforeStart {
        start: ReferenceMonth,
        end: ReferenceMonth,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount: String,
    pub description: String,
    pub category_id: String,
    /// Raw `DD/MM/YYYY HH:mm` input, masked before validation.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub category_id: i64,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub date: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn validate(&self, user_id: i64, kind: TxType) -> Result<NewTransaction, DraftError> {
        self.validate_in(user_id, kind, &Local)
    }

    /// Validates the draft reading its date as wall-clock time in `tz`.
    pub fn validate_in<Tz: TimeZone>(
        &self,
        user_id: i64,
        kind: TxType,
        tz: &Tz,
    ) -> Result<NewTransaction, DraftError> {
        let amount = required("amount", &self.amount)?;
        let description = required("description", &self.description)?;
        let category_id = required("category", &self.category_id)?;
        let date = required("date", &self.date)?;

        let masked = mask::format(date);
        let date = mask::to_utc_in(&masked, tz).ok_or(DraftError::InvalidDate(masked))?;

        Ok(NewTransaction {
            user_id,
            amount: parse_amount(amount)?,
            description: description.to_string(),
            category_id: parse_category(category_id)?,
            kind,
            date,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionDraft {
    pub amount: String,
    pub description: String,
    pub kind: Option<TxType>,
    pub category_id: String,
    pub is_recurring: bool,
    /// `YYYY-MM`; only read when `is_recurring` is set.
    pub end_month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProjection {
    pub user_id: i64,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub category_id: i64,
    pub is_recurring: bool,
    pub end_month: Option<ReferenceMonth>,
    pub date: DateTime<Utc>,
}

impl ProjectionDraft {
    /// Validates the draft for a projection starting at `date`.
    pub fn validate(&self, user_id: i64, date: DateTime<Utc>) -> Result<NewProjection, DraftError> {
        self.validate_in(user_id, date, &Local)
    }

    pub fn validate_in<Tz: TimeZone>(
        &self,
        user_id: i64,
        date: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<NewProjection, DraftError> {
        let amount = required("amount", &self.amount)?;
        let description = required("description", &self.description)?;
        let kind = self.kind.ok_or(DraftError::Missing("type"))?;
        let category_id = required("category", &self.category_id)?;

        let end_month = if self.is_recurring {
            let raw = self.end_month.trim();
            if raw.is_empty() {
                return Err(DraftError::MissingEndMonth);
            }

            let end = ReferenceMonth::from_str(raw)
                .map_err(|_| DraftError::InvalidEndMonth(raw.to_string()))?;
            let start = ReferenceMonth::of(&date.with_timezone(tz));
            if end < start {
                return Err(DraftError::EndBeforeStart { start, end });
            }

            Some(end)
        } else {
            None
        };

        Ok(NewProjection {
            user_id,
            amount: parse_amount(amount)?,
            description: description.to_string(),
            kind,
            category_id: parse_category(category_id)?,
            is_recurring: self.is_recurring,
            end_month,
            date,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DraftError> {
    match value.trim() {
        "" => Err(DraftError::Missing(field)),
        v => Ok(v),
    }
}

/// Accepts both `.` and `,` as the decimal separator.
fn parse_amount(raw: &str) -> Result<Decimal, DraftError> {
    let amount = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|_| DraftError::InvalidAmount(raw.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(DraftError::NonPositiveAmount);
    }

    Ok(amount)
}

fn parse_category(raw: &str) -> Result<i64, DraftError> {
    raw.parse()
        .map_err(|_| DraftError::InvalidCategory(raw.to_string()))
}
