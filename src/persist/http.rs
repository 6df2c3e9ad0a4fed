//! Remote persistence backend over the dev storage endpoint.
//!
//! The sink is a single shared JSON document: `GET /api/storage` returns the
//! whole document (or `{}` when nothing was ever saved) and `POST` replaces
//! it wholesale. Slot granularity does not survive this transport; the
//! document is always shipped in full.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::{Error, Result};

use super::{Document, PersistBackend, Slot};

/// HTTP backend for the shared storage document.
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Create a backend for the given base URL (e.g. `http://localhost:8787`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn storage_url(&self) -> String {
        format!("{}/api/storage", self.base_url)
    }
}

impl PersistBackend for HttpBackend {
    fn load(&mut self) -> Result<Document> {
        let response = self
            .agent
            .get(&self.storage_url())
            .call()
            .map_err(|e| Error::Http(format!("GET {}: {}", self.storage_url(), e)))?;
        let raw = response
            .into_string()
            .map_err(|e| Error::Http(format!("reading storage response: {}", e)))?;
        // An empty or unparsable document starts the session from scratch.
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn save(&mut self, doc: &Document, _dirty: &BTreeSet<Slot>) -> Result<()> {
        let body = serde_json::to_string(doc)?;
        let response = self
            .agent
            .post(&self.storage_url())
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| Error::Http(format!("POST {}: {}", self.storage_url(), e)))?;

        let reply: serde_json::Value = response
            .into_json()
            .map_err(|e| Error::Http(format!("reading storage reply: {}", e)))?;
        if reply.get("success").and_then(|v| v.as_bool()) != Some(true) {
            return Err(Error::Http(format!(
                "storage endpoint rejected the write: {}",
                reply
            )));
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.storage_url()
    }

    fn backend_type(&self) -> &'static str {
        "http"
    }
}
