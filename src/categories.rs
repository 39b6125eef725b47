use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use clap::ArgMatches;
use finpal_core::{Category, TxType};
use tokio::sync::Mutex;
use tracing::debug;

use crate::display::print_categories;
use crate::settings::Settings;
use crate::upstream::{self, CategorySource, HttpSource};

/// Read-through cache in front of a [`CategorySource`]. Each type is fetched
/// at most once; `None` caches the unfiltered listing.
pub struct CategoryCache<'a, S> {
    source: &'a S,
    entries: Mutex<HashMap<Option<TxType>, Vec<Category>>>,
}

impl<'a, S: CategorySource + Sync> CategoryCache<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Categories usable for `kind`. Untyped categories are kept since the
    /// server may not know their type yet.
    pub async fn categories(&self, kind: Option<TxType>) -> upstream::Result<Vec<Category>> {
        let mut entries = self.entries.lock().await;
        if let Some(hit) = entries.get(&kind) {
            return Ok(hit.clone());
        }

        let fetched: Vec<Category> = self
            .source
            .categories(kind)
            .await?
            .into_iter()
            .filter(|c| match (kind, c.kind) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            })
            .collect();
        debug!(?kind, "cached {} categories", fetched.len());

        entries.insert(kind, fetched.clone());
        Ok(fetched)
    }

    pub async fn find(&self, kind: TxType, id: i64) -> upstream::Result<Option<Category>> {
        Ok(self
            .categories(Some(kind))
            .await?
            .into_iter()
            .find(|c| c.id == id))
    }
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let kind = matches.value_of("type").map(str::parse::<TxType>).transpose()?;
    let source = HttpSource::new(&settings.api_url)?;
    let cache = CategoryCache::new(&source);

    let categories = cache.categories(kind).await?;

    let mut out = std::io::stdout();
    print_categories(&mut out, &categories)?;
    out.flush()?;

    Ok(())
}
