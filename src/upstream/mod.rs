pub mod http;

use axum::async_trait;
use finpal_core::{Category, NewProjection, NewTransaction, Projection, Transaction, TxType};
use thiserror::Error;

pub use http::HttpSource;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Uri(#[from] hyper::http::uri::InvalidUri),
    #[error(transparent)]
    Request(#[from] hyper::http::Error),
    #[error("request failed: {0}")]
    Transport(#[from] hyper::Error),
    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;

#[async_trait]
pub trait TransactionSource {
    async fn transactions(&self) -> Result<Vec<Transaction>>;

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<()>;
}

#[async_trait]
pub trait ProjectionSource {
    async fn projections(&self) -> Result<Vec<Projection>>;

    async fn create_projection(&self, projection: &NewProjection) -> Result<()>;
}

#[async_trait]
pub trait CategorySource {
    /// Lists categories, restricted to one type when `kind` is given.
    async fn categories(&self, kind: Option<TxType>) -> Result<Vec<Category>>;
}
