use axum::async_trait;
use finpal_core::{Category, NewProjection, NewTransaction, Projection, Transaction, TxType};
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::upstream::{CategorySource, Error, ProjectionSource, Result, TransactionSource};

/// JSON-over-HTTP client for the finance API.
pub struct HttpSource {
    client: Client<HttpConnector>,
    base: Url,
}

impl HttpSource {
    pub fn new(api_url: &str) -> Result<Self> {
        let mut base = Url::parse(api_url)?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> Result<Uri> {
        let mut url = self.base.join(path)?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }

        Ok(url.as_str().parse()?)
    }

    async fn send(&self, req: Request<Body>) -> Result<Bytes> {
        let res = self.client.request(req).await?;
        let status = res.status();
        let body = hyper::body::to_bytes(res.into_body()).await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, uri: Uri) -> Result<T> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())?;

        let body = self.send(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post<B: Serialize + Sync>(&self, uri: Uri, payload: &B) -> Result<()> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(payload)?))?;

        self.send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for HttpSource {
    #[tracing::instrument(skip(self))]
    async fn transactions(&self) -> Result<Vec<Transaction>> {
        let txs: Vec<Transaction> = self.get(self.endpoint("transactions", None)?).await?;
        debug!("fetched {} transactions", txs.len());
        Ok(txs)
    }

    #[tracing::instrument(skip(self, tx), fields(kind = %tx.kind))]
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<()> {
        self.post(self.endpoint("transactions", None)?, tx).await
    }
}

#[async_trait]
impl ProjectionSource for HttpSource {
    #[tracing::instrument(skip(self))]
    async fn projections(&self) -> Result<Vec<Projection>> {
        let projections: Vec<Projection> = self.get(self.endpoint("projections", None)?).await?;
        debug!("fetched {} projections", projections.len());
        Ok(projections)
    }

    #[tracing::instrument(skip(self, projection), fields(kind = %projection.kind))]
    async fn create_projection(&self, projection: &NewProjection) -> Result<()> {
        self.post(self.endpoint("projections", None)?, projection).await
    }
}

#[async_trait]
impl CategorySource for HttpSource {
    #[tracing::instrument(skip(self))]
    async fn categories(&self, kind: Option<TxType>) -> Result<Vec<Category>> {
        let uri = self.endpoint("categories", kind.map(|k| ("type", k.as_str())))?;
        let categories: Vec<Category> = self.get(uri).await?;
        debug!("fetched {} categories", categories.len());
        Ok(categories)
    }
}
