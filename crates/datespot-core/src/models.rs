//! Domain models for place records.
//!
//! The collection file is read two ways. The enrich stage works on
//! [`PlaceDocument`]s, which keep every key, its position and its exact value,
//! so records it does not touch are written back as they were read. The load
//! stage decodes [`PlaceRecord`]s, the typed view of the fields it stores,
//! and projects them onto [`PlaceRow`]s, the columns of the `places` table.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// JSON key holding the generated one-line description.
pub const REVIEW_SUMMARY_KEY: &str = "reviewSummary";

/// One record of the collection file, kept exactly as it was read.
///
/// Key order is preserved, so is every value the pipeline does not
/// understand. Only [`set_review_summary`](Self::set_review_summary) changes
/// a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceDocument(Map<String, Value>);

impl PlaceDocument {
    /// Returns true if the record still needs a generated summary.
    ///
    /// The summary counts as missing when it is absent or falsy in the JSON
    /// sense (`null`, `""`, `false`, `0`, `[]`, `{}`). Any other value,
    /// placeholder text and whitespace included, is an existing summary.
    pub fn needs_summary(&self) -> bool {
        self.0.get(REVIEW_SUMMARY_KEY).is_none_or(is_falsy)
    }

    /// Stores `summary`, keeping the key's position if it already exists.
    pub fn set_review_summary(&mut self, summary: String) {
        self.0
            .insert(REVIEW_SUMMARY_KEY.to_string(), Value::String(summary));
    }

    pub fn name(&self) -> Cow<'_, str> {
        self.prompt_text("name")
    }

    pub fn category(&self) -> Cow<'_, str> {
        self.prompt_text("category")
    }

    pub fn address(&self) -> Cow<'_, str> {
        self.prompt_text("address")
    }

    /// A field rendered for the prompt: strings verbatim, absent or `null` as
    /// empty text, anything else as its JSON text.
    fn prompt_text(&self, key: &str) -> Cow<'_, str> {
        match self.0.get(key) {
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(Value::String(s)) => Cow::Borrowed(s),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Typed view of the fields the load stage persists.
///
/// Unknown keys (such as an upstream `description`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Generated one-line description. Empty or absent means "not enriched".
    #[serde(
        rename = "reviewSummary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub review_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(rename = "imageUrls", default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Natural key used for conflict detection in the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kakao_id: Option<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Identifier>,
}

impl PlaceRecord {
    /// Returns true if the record has no summary to store.
    pub fn needs_summary(&self) -> bool {
        self.review_summary.as_deref().is_none_or(str::is_empty)
    }

    /// The natural key as text, if present and non-empty.
    pub fn key(&self) -> Option<String> {
        self.kakao_id
            .as_ref()
            .map(ToString::to_string)
            .filter(|k| !k.is_empty())
    }
}

/// Identifier that upstream sources emit either as text or as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(Number),
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Text(s) => f.write_str(s),
            Identifier::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A record projected onto the stored column order:
/// `name, category, address, review_summary, latitude, longitude, rating,
/// image_urls, image_url, kakao_id, serial_number`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRow {
    pub name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    /// Never NULL: an absent summary is stored as the empty string.
    pub review_summary: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    /// JSON array text, `[]` when the record has no images.
    pub image_urls: String,
    pub image_url: Option<String>,
    pub kakao_id: Option<String>,
    pub serial_number: Option<String>,
}

impl PlaceRow {
    pub fn from_record(record: &PlaceRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: record.name.clone(),
            category: record.category.clone(),
            address: record.address.clone(),
            review_summary: record.review_summary.clone().unwrap_or_default(),
            latitude: record.latitude,
            longitude: record.longitude,
            rating: record.rating,
            image_urls: encode_image_urls(record.image_urls.as_deref().unwrap_or_default())?,
            image_url: record.image_url.clone(),
            kakao_id: record.key(),
            serial_number: record.serial_number.as_ref().map(ToString::to_string),
        })
    }
}

/// Encodes an ordered list of image URLs as JSON array text.
pub fn encode_image_urls(urls: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(urls)
}

/// Decodes JSON array text produced by [`encode_image_urls`].
pub fn decode_image_urls(encoded: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(encoded)
}
