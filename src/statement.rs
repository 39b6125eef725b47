use std::io::Write;

use anyhow::{Context, Result};
use clap::ArgMatches;
use finpal_core::period::{filter_by_month, group_by_category, summarize};
use finpal_core::ReferenceMonth;

use crate::display::{money, print_statement};
use crate::settings::Settings;
use crate::upstream::{HttpSource, TransactionSource};

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let month = match matches.value_of("month") {
        Some(m) => m.parse()?,
        None => ReferenceMonth::current(),
    };
    let currency = settings.currency()?;
    let source = HttpSource::new(&settings.api_url)?;

    let txs = source
        .transactions()
        .await
        .context("failed to load transactions")?;
    let current = filter_by_month(&txs, month);

    let mut out = std::io::stdout();
    writeln!(out, "Statement for {}\n", month.label())?;
    print_statement(&mut out, &group_by_category(&current), currency)?;
    writeln!(
        out,
        "\nBalance: {}",
        money(summarize(&current).balance, currency)
    )?;
    out.flush()?;

    Ok(())
}
