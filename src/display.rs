use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use chrono::Local;
use finpal_core::{Category, Entry, Projection, ReferenceMonth, Totals, TxType};
use rust_decimal::Decimal;
use rusty_money::{iso::Currency, Money};
use tabwriter::TabWriter;

pub fn money(amount: Decimal, currency: &Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

/// Heading used for each type on the dashboard and statement.
pub fn heading(kind: TxType) -> &'static str {
    match kind {
        TxType::Expense => "Expenses",
        TxType::Income => "Income",
        TxType::Investment => "Investments",
    }
}

pub fn print_totals<T: Write>(
    wr: T,
    month: ReferenceMonth,
    actual: &Totals,
    projected: &Totals,
    currency: &Currency,
) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "{}\tActual\tProjected", month.label())?;

    let rows = [
        (heading(TxType::Expense), actual.expenses, projected.expenses),
        (heading(TxType::Income), actual.incomes, projected.incomes),
        (heading(TxType::Investment), actual.investments, projected.investments),
        ("Balance", actual.balance, projected.balance),
    ];
    for (label, actual, projected) in rows {
        writeln!(
            tw,
            "{}\t{}\t{}",
            label,
            money(actual, currency),
            money(projected, currency)
        )?;
    }

    tw.flush()?;

    Ok(())
}

pub fn print_category_totals<T: Write>(
    wr: T,
    kind: TxType,
    totals: &BTreeMap<String, Decimal>,
    currency: &Currency,
) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "{}\tTotal", heading(kind))?;

    for (category, total) in totals {
        writeln!(tw, "  {}\t{}", category, money(*total, currency))?;
    }

    tw.flush()?;

    Ok(())
}

/// Statement listing: one block per category, entries in input order.
pub fn print_statement<T: Write, E: Entry>(
    wr: T,
    groups: &BTreeMap<String, Vec<E>>,
    currency: &Currency,
) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "Category\tDate\tType\tDescription\tAmount")?;

    for (category, entries) in groups {
        for entry in entries {
            writeln!(
                tw,
                "{}\t{}\t{}\t{}\t{}",
                category,
                entry.date().with_timezone(&Local).format("%d/%m/%Y"),
                entry.kind(),
                entry.description(),
                money(entry.amount(), currency),
            )?;
        }
    }

    tw.flush()?;

    Ok(())
}

pub fn print_projections<T: Write>(
    wr: T,
    projections: &[&Projection],
    currency: &Currency,
) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tType\tCategory\tDescription\tAmount\tRepeats until")?;

    for p in projections {
        let until = match (p.is_recurring, p.end_month) {
            (true, Some(end)) => end.to_string(),
            (true, None) => "open".to_string(),
            (false, _) => "-".to_string(),
        };
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}",
            p.id,
            p.kind,
            p.category,
            p.description,
            money(p.amount, currency),
            until,
        )?;
    }

    tw.flush()?;

    Ok(())
}

pub fn print_categories<T: Write>(wr: T, categories: &[Category]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tName\tType")?;

    for category in categories {
        writeln!(
            tw,
            "{}\t{}\t{}",
            category.id,
            category.name,
            category.kind.map_or("-", |k| k.as_str()),
        )?;
    }

    tw.flush()?;

    Ok(())
}
