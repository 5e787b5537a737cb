//! [`CosmosStore`], the Cosmos DB implementation of [`VoteStore`].

use std::{collections::HashSet, sync::Arc, time::Duration};

use ballot_core::{
  store::{VoteCollection, VoteStore},
  vote::{PARTITION_KEY_PATH, Vote},
};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use serde_json::json;

use crate::{
  Error, Result,
  auth::{MasterKey, http_date},
};

/// REST API version sent with every request.
pub const API_VERSION: &str = "2018-12-31";

const HEADER_DATE: &str = "x-ms-date";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_MAX_ITEMS: &str = "x-ms-max-item-count";
const HEADER_CONTINUATION: &str = "x-ms-continuation";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for a Cosmos DB account.
#[derive(Debug, Clone)]
pub struct CosmosConfig {
  /// Account endpoint, e.g. `https://myaccount.documents.azure.com:443/`.
  pub endpoint:  String,
  /// Base64 master key.
  pub key:       String,
  pub database:  String,
  pub container: String,
  pub timeout:   Duration,
  /// Documents requested per read-feed page.
  pub page_size: u32,
}

impl CosmosConfig {
  pub fn new(
    endpoint: impl Into<String>,
    key: impl Into<String>,
    database: impl Into<String>,
    container: impl Into<String>,
  ) -> Self {
    Self {
      endpoint:  endpoint.into(),
      key:       key.into(),
      database:  database.into(),
      container: container.into(),
      timeout:   Duration::from_secs(30),
      page_size: 1000,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

struct Shared {
  client:    Client,
  endpoint:  String,
  key:       MasterKey,
  database:  String,
  container: String,
  page_size: u32,
}

/// A vote store backed by a Cosmos DB container.
///
/// Cheap to clone; the HTTP client and settings are shared.
#[derive(Clone)]
pub struct CosmosStore {
  shared: Arc<Shared>,
}

/// Outcome of a create-if-absent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Created {
  New,
  Existing,
}

impl CosmosStore {
  /// Validate `config` and build the HTTP client. Performs no I/O.
  pub fn new(config: CosmosConfig) -> Result<Self> {
    let endpoint = url::Url::parse(&config.endpoint)?;
    let key = MasterKey::from_base64(&config.key)?;
    let client = Client::builder().timeout(config.timeout).build()?;

    Ok(Self {
      shared: Arc::new(Shared {
        client,
        endpoint: endpoint.as_str().trim_end_matches('/').to_owned(),
        key,
        database: config.database,
        container: config.container,
        page_size: config.page_size.max(1),
      }),
    })
  }

  pub fn database(&self) -> &str { &self.shared.database }

  pub fn container(&self) -> &str { &self.shared.container }

  async fn create_if_absent(
    &self,
    operation: &'static str,
    resource_type: &str,
    resource_link: &str,
    path: &str,
    body: serde_json::Value,
  ) -> Result<Created> {
    let resp = self
      .shared
      .request(Method::POST, resource_type, resource_link, path)
      .json(&body)
      .send()
      .await?;

    match resp.status() {
      StatusCode::CONFLICT => Ok(Created::Existing),
      s if s.is_success() => Ok(Created::New),
      _ => Err(status_error(operation, resp).await),
    }
  }
}

impl Shared {
  /// Start a signed request. `resource_link` is the link of the resource
  /// being addressed, without leading or trailing slashes.
  fn request(
    &self,
    method: Method,
    resource_type: &str,
    resource_link: &str,
    path: &str,
  ) -> RequestBuilder {
    let date = http_date(Utc::now());
    let token = self.key.token(&method, resource_type, resource_link, &date);
    self
      .client
      .request(method, format!("{}/{}", self.endpoint, path))
      .header(HEADER_DATE, date)
      .header(HEADER_VERSION, API_VERSION)
      .header(header::AUTHORIZATION, token)
  }
}

/// Drain a failed response into [`Error::Status`].
async fn status_error(operation: &'static str, resp: Response) -> Error {
  let status = resp.status();
  let body = resp.text().await.unwrap_or_default();
  Error::Status {
    operation,
    status,
    body,
  }
}

/// Encode a partition key value as the JSON array header Cosmos expects.
///
/// Header values must be visible ASCII, so anything outside that range is
/// written as a JSON `\u` escape.
pub(crate) fn partition_key_header(value: &str) -> Result<String> {
  let json = serde_json::to_string(&[value])?;
  let mut out = String::with_capacity(json.len());
  for c in json.chars() {
    if c.is_ascii() && !c.is_ascii_control() {
      out.push(c);
    } else {
      let mut units = [0u16; 2];
      for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{unit:04x}"));
      }
    }
  }
  Ok(out)
}

// ─── Collection handle ───────────────────────────────────────────────────────

/// Handle to the vote container, returned by
/// [`VoteStore::ensure_collection`].
#[derive(Clone)]
pub struct CosmosCollection {
  shared: Arc<Shared>,
  link:   String,
}

impl CosmosCollection {
  /// Resource link of the container, `dbs/{db}/colls/{container}`.
  pub fn link(&self) -> &str { &self.link }
}

#[derive(Deserialize)]
struct FeedPage {
  #[serde(rename = "Documents")]
  documents: Vec<Vote>,
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl VoteStore for CosmosStore {
  type Error = Error;
  type Collection = CosmosCollection;

  async fn ensure_collection(&self) -> Result<CosmosCollection> {
    let db_link = format!("dbs/{}", self.shared.database);
    let coll_link = format!("{db_link}/colls/{}", self.shared.container);

    let db = self
      .create_if_absent(
        "create database",
        "dbs",
        "",
        "dbs",
        json!({ "id": self.shared.database }),
      )
      .await?;
    if db == Created::New {
      tracing::info!(database = %self.shared.database, "created database");
    }

    let coll = self
      .create_if_absent(
        "create container",
        "colls",
        &db_link,
        &format!("{db_link}/colls"),
        json!({
          "id": self.shared.container,
          "partitionKey": { "paths": [PARTITION_KEY_PATH], "kind": "Hash" },
        }),
      )
      .await?;
    if coll == Created::New {
      tracing::info!(container = %self.shared.container, "created container");
    }

    Ok(CosmosCollection {
      shared: self.shared.clone(),
      link:   coll_link,
    })
  }
}

impl VoteCollection for CosmosCollection {
  type Error = Error;

  async fn insert(&self, vote: Vote) -> Result<()> {
    let partition = partition_key_header(&vote.candidate_id)?;
    let resp = self
      .shared
      .request(Method::POST, "docs", &self.link, &format!("{}/docs", self.link))
      .header(HEADER_PARTITION_KEY, partition)
      .json(&vote)
      .send()
      .await?;

    match resp.status() {
      StatusCode::CONFLICT => Err(Error::Conflict(vote.id)),
      s if s.is_success() => Ok(()),
      _ => Err(status_error("create document", resp).await),
    }
  }

  async fn scan_all(&self) -> Result<Vec<Vote>> {
    let path = format!("{}/docs", self.link);
    let mut votes = Vec::new();
    let mut continuation: Option<String> = None;
    let mut seen = HashSet::new();

    loop {
      let mut req = self
        .shared
        .request(Method::GET, "docs", &self.link, &path)
        .header(HEADER_MAX_ITEMS, self.shared.page_size.to_string());
      if let Some(token) = &continuation {
        req = req.header(HEADER_CONTINUATION, token.as_str());
      }

      let resp = req.send().await?;
      if !resp.status().is_success() {
        return Err(status_error("read document feed", resp).await);
      }

      let next = resp
        .headers()
        .get(HEADER_CONTINUATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

      let page: FeedPage = serde_json::from_slice(&resp.bytes().await?)?;
      tracing::debug!(documents = page.documents.len(), "read feed page");
      votes.extend(page.documents);

      match next {
        Some(token) if !seen.insert(token.clone()) => {
          return Err(Error::RepeatedContinuation(token));
        }
        Some(token) => continuation = Some(token),
        None => break,
      }
    }

    Ok(votes)
  }
}
