//! HTTP transport for the session-ownership endpoint.

use std::time::Duration;

use crate::{Error, Result};

use super::{SessionAction, SessionReply, SessionRelease, SessionRequest, SessionTransport};

/// Blocking client for `POST`/`DELETE /api/session`.
pub struct HttpSessionTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSessionTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(5))
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn session_url(&self) -> String {
        format!("{}/api/session", self.base_url)
    }

    fn post(&self, session_id: &str, action: SessionAction) -> Result<SessionReply> {
        let request = SessionRequest {
            session_id: session_id.to_string(),
            action,
        };
        let response = self
            .agent
            .post(&self.session_url())
            .set("Content-Type", "application/json")
            .send_string(&serde_json::to_string(&request)?)
            .map_err(|e| Error::Http(format!("POST {}: {}", self.session_url(), e)))?;
        response
            .into_json()
            .map_err(|e| Error::Http(format!("reading session reply: {}", e)))
    }
}

impl SessionTransport for HttpSessionTransport {
    fn register(&self, session_id: &str) -> Result<SessionReply> {
        self.post(session_id, SessionAction::Register)
    }

    fn heartbeat(&self, session_id: &str) -> Result<SessionReply> {
        self.post(session_id, SessionAction::Heartbeat)
    }

    fn release(&self, session_id: &str) -> Result<()> {
        let request = SessionRelease {
            session_id: session_id.to_string(),
        };
        self.agent
            .delete(&self.session_url())
            .set("Content-Type", "application/json")
            .send_string(&serde_json::to_string(&request)?)
            .map_err(|e| Error::Http(format!("DELETE {}: {}", self.session_url(), e)))?;
        Ok(())
    }
}
