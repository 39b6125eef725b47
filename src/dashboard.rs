use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::ArgMatches;
use finpal_core::period::{filter_by_month_in, group_by_category_with_total, projected_in, summarize};
use finpal_core::{Direction, Projection, ReferenceMonth, Totals, Transaction, TxType};
use rust_decimal::Decimal;

use crate::display::{print_category_totals, print_totals};
use crate::settings::Settings;
use crate::upstream::{HttpSource, ProjectionSource, TransactionSource};

/// Everything the dashboard shows for one reference month.
#[derive(Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub month: ReferenceMonth,
    pub actual: Totals,
    pub projected: Totals,
    pub by_category: Vec<(TxType, BTreeMap<String, Decimal>)>,
}

impl Dashboard {
    pub fn build_in<Tz: TimeZone>(
        txs: &[Transaction],
        projections: &[Projection],
        month: ReferenceMonth,
        tz: &Tz,
    ) -> Self {
        let current = filter_by_month_in(txs, month, tz);
        let planned = projected_in(projections, month, tz);

        Self {
            month,
            actual: summarize(&current),
            projected: summarize(&planned),
            by_category: TxType::ALL
                .iter()
                .map(|kind| (*kind, group_by_category_with_total(&current, *kind)))
                .filter(|(_, totals)| !totals.is_empty())
                .collect(),
        }
    }
}

/// Picks the reference month from `--month`, then applies `--previous` or
/// `--next`.
pub(crate) fn reference_month(matches: &ArgMatches) -> Result<ReferenceMonth> {
    let month = match matches.value_of("month") {
        Some(m) => m.parse()?,
        None => ReferenceMonth::current(),
    };

    Ok(if matches.is_present("previous") {
        month.shift(Direction::Previous)
    } else if matches.is_present("next") {
        month.shift(Direction::Next)
    } else {
        month
    })
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let month = reference_month(matches)?;
    let currency = settings.currency()?;
    let source = HttpSource::new(&settings.api_url)?;

    let (txs, projections) = tokio::try_join!(source.transactions(), source.projections())
        .context("failed to load financial data")?;

    let dashboard = Dashboard::build_in(&txs, &projections, month, &Local);

    let mut out = std::io::stdout();
    print_totals(&mut out, month, &dashboard.actual, &dashboard.projected, currency)?;
    for (kind, totals) in &dashboard.by_category {
        writeln!(out)?;
        print_category_totals(&mut out, *kind, totals, currency)?;
    }
    out.flush()?;

    Ok(())
}
