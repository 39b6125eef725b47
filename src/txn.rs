use anyhow::Result;
use clap::ArgMatches;
use finpal_core::{mask, Category, DraftError, NewTransaction, TransactionDraft, TxType};
use thiserror::Error;
use tracing::info;

use crate::categories::CategoryCache;
use crate::display::money;
use crate::settings::Settings;
use crate::upstream::{self, CategorySource, HttpSource, TransactionSource};

/// Why a submission did not reach the server, or was refused by it.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] DraftError),
    #[error("no {kind} category with id {id}")]
    UnknownCategory { kind: TxType, id: i64 },
    #[error(transparent)]
    Upstream(#[from] upstream::Error),
}

#[derive(Debug)]
pub struct Receipt {
    pub tx: NewTransaction,
    pub category: Category,
}

#[tracing::instrument(skip(source, categories, draft))]
pub(crate) async fn submit<S>(
    source: &S,
    categories: &CategoryCache<'_, S>,
    user_id: i64,
    kind: TxType,
    draft: &TransactionDraft,
) -> std::result::Result<Receipt, SubmitError>
where
    S: TransactionSource + CategorySource + Sync,
{
    let tx = draft.validate(user_id, kind)?;
    let category = categories
        .find(kind, tx.category_id)
        .await?
        .ok_or(SubmitError::UnknownCategory {
            kind,
            id: tx.category_id,
        })?;

    source.create_transaction(&tx).await?;
    info!(category = %category.name, "saved {}", kind);

    Ok(Receipt { tx, category })
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let kind: TxType = matches.value_of("TYPE").unwrap_or_default().parse()?;
    let draft = TransactionDraft {
        amount: matches.value_of("amount").unwrap_or_default().to_string(),
        description: matches.value_of("description").unwrap_or_default().to_string(),
        category_id: matches.value_of("category").unwrap_or_default().to_string(),
        date: matches
            .value_of("date")
            .map_or_else(mask::now, |d| d.to_string()),
    };

    let currency = settings.currency()?;
    let source = HttpSource::new(&settings.api_url)?;
    let categories = CategoryCache::new(&source);

    let receipt = submit(&source, &categories, settings.user_id, kind, &draft).await?;
    println!(
        "Saved {} of {} in {} ({}).",
        kind,
        money(receipt.tx.amount, currency),
        receipt.category.name,
        receipt.tx.date.with_timezone(&chrono::Local).format(mask::PATTERN),
    );

    Ok(())
}
