//! Master-key request signing.
//!
//! Every request carries an `authorization` header of the form
//! `type=master&ver=1.0&sig=<signature>`, URL-encoded, where the signature is
//! the base64 HMAC-SHA256 of
//!
//! ```text
//! lower(verb) \n lower(resourceType) \n resourceLink \n lower(x-ms-date) \n \n
//! ```
//!
//! keyed with the base64-decoded account key.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// A decoded account master key, ready to sign requests.
#[derive(Clone)]
pub struct MasterKey {
  mac: HmacSha256,
}

impl fmt::Debug for MasterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("MasterKey(..)")
  }
}

impl MasterKey {
  pub fn from_base64(key: &str) -> Result<Self> {
    let bytes = B64
      .decode(key.trim())
      .map_err(|e| Error::InvalidKey(e.to_string()))?;
    if bytes.is_empty() {
      return Err(Error::InvalidKey("key is empty".to_owned()));
    }
    let mac = HmacSha256::new_from_slice(&bytes)
      .map_err(|e| Error::InvalidKey(e.to_string()))?;
    Ok(Self { mac })
  }

  /// Build the URL-encoded `authorization` header value.
  pub fn token(
    &self,
    verb: &Method,
    resource_type: &str,
    resource_link: &str,
    date: &str,
  ) -> String {
    let payload = format!(
      "{}\n{}\n{}\n{}\n\n",
      verb.as_str().to_lowercase(),
      resource_type.to_lowercase(),
      resource_link,
      date.to_lowercase(),
    );

    let mut mac = self.mac.clone();
    mac.update(payload.as_bytes());
    let sig = B64.encode(mac.finalize().into_bytes());

    let raw = format!("type=master&ver=1.0&sig={sig}");
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
  }
}

/// RFC 1123 date as expected in the `x-ms-date` header.
pub fn http_date(at: DateTime<Utc>) -> String {
  at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
