use serde::{Deserialize, Serialize};

use crate::error::{MathFieldError, Result};
use crate::html::render_to_html;
use crate::renderer::MathRenderer;

/// Raw user text together with its rendered HTML.
///
/// Stored as a JSON object with exactly the keys `raw` and `html`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MathValue {
    raw: String,
    html: String,
}

impl MathValue {
    /// Pair `raw` with `html` as given, no rendering.
    pub fn new(raw: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            html: html.into(),
        }
    }

    /// Build the canonical pair for `raw`.
    ///
    /// If `raw` is empty or `html` is already known (non-empty) the pair is
    /// returned as given and the renderer is never touched. Otherwise `html`
    /// is rendered from `raw`.
    pub fn construct<R>(raw: impl Into<String>, html: Option<&str>, renderer: &R) -> Result<Self>
    where
        R: MathRenderer + ?Sized,
    {
        let raw = raw.into();
        let known = html.filter(|html| !html.is_empty());
        if raw.is_empty() || known.is_some() {
            return Ok(Self::new(raw, html.unwrap_or_default()));
        }
        let html = render_to_html(&raw, renderer)?;
        Ok(Self { raw, html })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.html.is_empty()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.raw, self.html)
    }

    /// Serialized form for storage.
    pub fn to_storage(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored pair; `None` if `stored` isn't exactly `{raw, html}`.
    pub fn from_storage(stored: &str) -> Option<Self> {
        let json: serde_json::Value = serde_json::from_str(stored).ok()?;
        Self::from_json(&json).ok()
    }

    /// Accept a JSON object holding exactly the string keys `raw` and `html`.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        if !json.is_object() {
            return Err(MathFieldError::malformed(json));
        }
        Self::deserialize(json).map_err(|_| MathFieldError::malformed(json))
    }
}
