use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ArgMatches;
use finpal_core::period::projected;
use finpal_core::{NewProjection, ProjectionDraft, ReferenceMonth, TxType};
use tracing::info;

use crate::categories::CategoryCache;
use crate::display::{money, print_projections};
use crate::settings::Settings;
use crate::txn::SubmitError;
use crate::upstream::{CategorySource, HttpSource, ProjectionSource};

#[tracing::instrument(skip(source, categories, draft))]
pub(crate) async fn submit<S>(
    source: &S,
    categories: &CategoryCache<'_, S>,
    user_id: i64,
    draft: &ProjectionDraft,
) -> std::result::Result<NewProjection, SubmitError>
where
    S: ProjectionSource + CategorySource + Sync,
{
    let projection = draft.validate(user_id, Utc::now())?;
    if categories
        .find(projection.kind, projection.category_id)
        .await?
        .is_none()
    {
        return Err(SubmitError::UnknownCategory {
            kind: projection.kind,
            id: projection.category_id,
        });
    }

    source.create_projection(&projection).await?;
    info!(recurring = projection.is_recurring, "saved {} projection", projection.kind);

    Ok(projection)
}

async fn add(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let draft = ProjectionDraft {
        amount: matches.value_of("amount").unwrap_or_default().to_string(),
        description: matches.value_of("description").unwrap_or_default().to_string(),
        kind: matches.value_of("type").map(str::parse::<TxType>).transpose()?,
        category_id: matches.value_of("category").unwrap_or_default().to_string(),
        is_recurring: matches.is_present("recurring"),
        end_month: matches.value_of("until").unwrap_or_default().to_string(),
    };

    let currency = settings.currency()?;
    let source = HttpSource::new(&settings.api_url)?;
    let categories = CategoryCache::new(&source);

    let projection = submit(&source, &categories, settings.user_id, &draft).await?;
    match projection.end_month {
        Some(end) => println!(
            "Projected {} of {} every month until {}.",
            projection.kind,
            money(projection.amount, currency),
            end.label()
        ),
        None => println!(
            "Projected {} of {}.",
            projection.kind,
            money(projection.amount, currency)
        ),
    }

    Ok(())
}

async fn list(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let month = matches
        .value_of("month")
        .map(str::parse::<ReferenceMonth>)
        .transpose()?;
    let currency = settings.currency()?;
    let source = HttpSource::new(&settings.api_url)?;

    let projections = source
        .projections()
        .await
        .context("failed to load projections")?;
    let shown = match month {
        Some(m) => projected(&projections, m),
        None => projections.iter().collect(),
    };

    let mut out = std::io::stdout();
    print_projections(&mut out, &shown, currency)?;
    out.flush()?;

    Ok(())
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    match matches.subcommand() {
        Some(("add", add_matches)) => add(add_matches, settings).await,
        Some(("list", list_matches)) => list(list_matches, settings).await,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }
}
