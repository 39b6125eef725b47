//! Month filtering and totals for the dashboard and statement views.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{ParseError, Projection, TxType};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Anything with a date, a type, a category and a positive amount.
pub trait Entry {
    fn amount(&self) -> Decimal;
    fn kind(&self) -> TxType;
    fn category(&self) -> &str;
    fn description(&self) -> &str;
    fn date(&self) -> DateTime<Utc>;
}

impl<T: Entry + ?Sized> Entry for &T {
    fn amount(&self) -> Decimal {
        (**self).amount()
    }

    fn kind(&self) -> TxType {
        (**self).kind()
    }

    fn category(&self) -> &str {
        (**self).category()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn date(&self) -> DateTime<Utc> {
        (**self).date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// A calendar month, ordered chronologically. Written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceMonth {
    year: i32,
    month: u32,
}

impl ReferenceMonth {
    /// `month` is 1-based; returns `None` outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(&Local::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains<D: Datelike>(&self, date: &D) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn shift(self, direction: Direction) -> Self {
        match (direction, self.month) {
            (Direction::Previous, 1) => Self {
                year: self.year - 1,
                month: 12,
            },
            (Direction::Previous, m) => Self {
                month: m - 1,
                ..self
            },
            (Direction::Next, 12) => Self {
                year: self.year + 1,
                month: 1,
            },
            (Direction::Next, m) => Self {
                month: m + 1,
                ..self
            },
        }
    }

    /// Human readable form, e.g. "June 2024".
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize - 1], self.year)
    }
}

impl fmt::Display for ReferenceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReferenceMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Month(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        ReferenceMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for ReferenceMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Dashboard figures for one set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub expenses: Decimal,
    pub incomes: Decimal,
    pub investments: Decimal,
    pub balance: Decimal,
}

/// Keeps the entries dated in `month` on the local calendar.
pub fn filter_by_month<T: Entry>(items: &[T], month: ReferenceMonth) -> Vec<&T> {
    filter_by_month_in(items, month, &Local)
}

pub fn filter_by_month_in<'a, T: Entry, Tz: TimeZone>(
    items: &'a [T],
    month: ReferenceMonth,
    tz: &Tz,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|entry| month.contains(&entry.date().with_timezone(tz)))
        .collect()
}

pub fn sum_by_type<T: Entry>(items: &[T], kind: TxType) -> Decimal {
    items
        .iter()
        .filter(|entry| entry.kind() == kind)
        .map(|entry| entry.amount())
        .sum()
}

/// Per-category totals for one type. Categories are matched verbatim.
pub fn group_by_category_with_total<T: Entry>(items: &[T], kind: TxType) -> BTreeMap<String, Decimal> {
    items
        .iter()
        .filter(|entry| entry.kind() == kind)
        .fold(BTreeMap::new(), |mut acc, entry| {
            *acc.entry(entry.category().to_string())
                .or_insert(Decimal::ZERO) += entry.amount();
            acc
        })
}

pub fn group_by_category<T: Entry>(items: &[T]) -> BTreeMap<String, Vec<&T>> {
    items.iter().fold(BTreeMap::new(), |mut acc, entry| {
        acc.entry(entry.category().to_string())
            .or_insert_with(Vec::new)
            .push(entry);
        acc
    })
}

/// Income minus everything that leaves the disposable balance, investments
/// included.
pub fn balance<T: Entry>(items: &[T]) -> Decimal {
    summarize(items).balance
}

pub fn summarize<T: Entry>(items: &[T]) -> Totals {
    let expenses = sum_by_type(items, TxType::Expense);
    let incomes = sum_by_type(items, TxType::Income);
    let investments = sum_by_type(items, TxType::Investment);

    Totals {
        expenses,
        incomes,
        investments,
        balance: incomes - expenses - investments,
    }
}

pub fn shift_month(month: ReferenceMonth, direction: Direction) -> ReferenceMonth {
    month.shift(direction)
}

/// Projections contributing to `month`, recurring ones included.
pub fn projected(items: &[Projection], month: ReferenceMonth) -> Vec<&Projection> {
    projected_in(items, month, &Local)
}

pub fn projected_in<'a, Tz: TimeZone>(
    items: &'a [Projection],
    month: ReferenceMonth,
    tz: &Tz,
) -> Vec<&'a Projection> {
    items.iter().filter(|p| p.occurs_in(month, tz)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::Transaction;

    fn tx(id: i64, amount: i64, kind: TxType, category: &str, date: &str) -> Transaction {
        Transaction {
            id,
            user_id: Some(1),
            amount: Decimal::from(amount),
            description: format!("entry {}", id),
            category_id: None,
            category: category.to_string(),
            kind,
            date: format!("{}T00:00:00Z", date).parse().unwrap(),
            created_at: None,
            updated_at: None,
        }
    }

    fn month(year: i32, month: u32) -> ReferenceMonth {
        ReferenceMonth::new(year, month).unwrap()
    }

    fn june_fixture() -> Vec<Transaction> {
        vec![
            tx(1, 100, TxType::Expense, "Food", "2024-06-01"),
            tx(2, 200, TxType::Income, "Salary", "2024-06-15"),
            tx(3, 50, TxType::Expense, "Food", "2024-07-01"),
        ]
    }

    #[test]
    fn filter_keeps_only_reference_month() {
        let txs = june_fixture();

        let june = filter_by_month_in(&txs, month(2024, 6), &Utc);

        assert_eq!(june.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(txs.len(), 3);
    }

    #[test]
    fn filter_matches_year_too() {
        let txs = vec![
            tx(1, 10, TxType::Expense, "Food", "2023-06-10"),
            tx(2, 10, TxType::Expense, "Food", "2024-06-10"),
        ];

        let june = filter_by_month_in(&txs, month(2024, 6), &Utc);

        assert_eq!(june.len(), 1);
        assert_eq!(june[0].id, 2);
    }

    #[test]
    fn totals_for_reference_month() {
        let txs = june_fixture();
        let june = filter_by_month_in(&txs, month(2024, 6), &Utc);

        assert_eq!(sum_by_type(&june, TxType::Expense), Decimal::from(100));
        assert_eq!(sum_by_type(&june, TxType::Income), Decimal::from(200));
        assert_eq!(sum_by_type(&june, TxType::Investment), Decimal::ZERO);
        assert_eq!(balance(&june), Decimal::from(100));
    }

    #[test]
    fn investments_reduce_balance() {
        let txs = vec![
            tx(1, 1000, TxType::Income, "Salary", "2024-06-05"),
            tx(2, 300, TxType::Expense, "Rent", "2024-06-06"),
            tx(3, 500, TxType::Investment, "Stocks", "2024-06-07"),
        ];

        assert_eq!(
            summarize(&txs),
            Totals {
                expenses: Decimal::from(300),
                incomes: Decimal::from(1000),
                investments: Decimal::from(500),
                balance: Decimal::from(200),
            }
        );
    }

    #[test]
    fn empty_input_yields_zero() {
        let txs: Vec<Transaction> = vec![];

        assert_eq!(sum_by_type(&txs, TxType::Expense), Decimal::ZERO);
        assert_eq!(summarize(&txs), Totals::default());
        assert!(group_by_category_with_total(&txs, TxType::Expense).is_empty());
        assert!(group_by_category(&txs).is_empty());
    }

    #[test]
    fn category_totals_for_one_type() {
        let txs = vec![
            tx(1, 30, TxType::Expense, "Food", "2024-06-01"),
            tx(2, 20, TxType::Expense, "Food", "2024-06-02"),
            tx(3, 500, TxType::Expense, "Rent", "2024-06-03"),
            tx(4, 900, TxType::Income, "Salary", "2024-06-04"),
        ];

        let totals = group_by_category_with_total(&txs, TxType::Expense);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], Decimal::from(50));
        assert_eq!(totals["Rent"], Decimal::from(500));
        assert!(!totals.contains_key("Salary"));
    }

    #[test]
    fn category_names_are_not_normalized() {
        let txs = vec![
            tx(1, 30, TxType::Expense, "Food", "2024-06-01"),
            tx(2, 20, TxType::Expense, "food ", "2024-06-02"),
        ];

        let totals = group_by_category_with_total(&txs, TxType::Expense);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], Decimal::from(30));
        assert_eq!(totals["food "], Decimal::from(20));
    }

    #[test]
    fn grouping_preserves_relative_order() {
        let txs = vec![
            tx(1, 30, TxType::Expense, "Food", "2024-06-03"),
            tx(2, 500, TxType::Expense, "Rent", "2024-06-01"),
            tx(3, 20, TxType::Income, "Food", "2024-06-02"),
            tx(4, 10, TxType::Expense, "Food", "2024-06-01"),
        ];

        let groups = group_by_category(&txs);

        let food: Vec<i64> = groups["Food"].iter().map(|t| t.id).collect();
        let rent: Vec<i64> = groups["Rent"].iter().map(|t| t.id).collect();
        assert_eq!(food, vec![1, 3, 4]);
        assert_eq!(rent, vec![2]);
    }

    #[test]
    fn shift_rolls_over_years() {
        let tests = vec![
            (month(2024, 12), Direction::Next, month(2025, 1)),
            (month(2024, 1), Direction::Previous, month(2023, 12)),
            (month(2024, 6), Direction::Next, month(2024, 7)),
            (month(2024, 6), Direction::Previous, month(2024, 5)),
        ];

        for t in tests {
            assert_eq!(shift_month(t.0, t.1), t.2);
        }
    }

    #[test]
    fn parse_reference_month() {
        assert_eq!("2024-06".parse::<ReferenceMonth>(), Ok(month(2024, 6)));
        assert_eq!("2024-6".parse::<ReferenceMonth>(), Ok(month(2024, 6)));

        for bad in ["2024-13", "2024-00", "24-06", "2024", "2024-06-01", "june"] {
            assert_eq!(
                bad.parse::<ReferenceMonth>(),
                Err(ParseError::Month(bad.to_string())),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn reference_month_display() {
        assert_eq!(month(2024, 6).to_string(), "2024-06");
        assert_eq!(month(2024, 6).label(), "June 2024");
        assert_eq!(ReferenceMonth::new(2024, 13), None);
    }

    #[test]
    fn months_order_chronologically() {
        assert!(month(2023, 12) < month(2024, 1));
        assert!(month(2024, 2) < month(2024, 10));
    }

    #[test]
    fn projected_includes_recurring() {
        let base = Projection {
            id: 1,
            amount: Decimal::from(1200),
            category: "Rent".to_string(),
            description: "apartment".to_string(),
            kind: TxType::Expense,
            date: "2024-01-10T12:00:00Z".parse().unwrap(),
            is_recurring: true,
            end_month: Some(month(2024, 12)),
        };
        let one_off = Projection {
            id: 2,
            amount: Decimal::from(300),
            is_recurring: false,
            end_month: None,
            date: "2024-05-20T12:00:00Z".parse().unwrap(),
            ..base.clone()
        };
        let projections = vec![base, one_off];

        let may = projected_in(&projections, month(2024, 5), &Utc);
        let june = projected_in(&projections, month(2024, 6), &Utc);

        assert_eq!(sum_by_type(&may, TxType::Expense), Decimal::from(1500));
        assert_eq!(sum_by_type(&june, TxType::Expense), Decimal::from(1200));
        assert!(projected_in(&projections, month(2025, 1), &Utc).is_empty());
    }
}
