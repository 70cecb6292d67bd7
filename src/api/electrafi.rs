//! [ElectraFi](https://www.electrafi.com) client.

use std::time::Duration;

use serde_json::Value;
use ureq::Agent;

use crate::{
    api::{Fetch, Request},
    error::ApiError,
    prelude::*,
};

pub const DEFAULT_BASE_URL: &str = "https://www.electrafi.com";

pub struct Api {
    agent: Agent,
    base_url: String,
    token: String,
}

impl Api {
    pub fn new(token: String, base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, base_url: base_url.trim_end_matches('/').to_owned(), token }
    }

    fn url(&self, request: &Request) -> String {
        format!("{}/{}", self.base_url, request.endpoint.path())
    }
}

impl Fetch for Api {
    #[instrument(skip_all, fields(endpoint = request.endpoint.path()))]
    fn fetch(&self, request: &Request) -> Result<Value> {
        debug!(%request, "requesting…");
        let mut response = self
            .agent
            .get(self.url(request))
            .header("Authorization", format!("Bearer {}", self.token))
            .query_pairs(request.query.iter().map(|(key, value)| (*key, value.as_str())))
            .call()
            .map_err(into_api_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.body_mut().read_to_string().unwrap_or_default();
            return Err(ApiError::Status { status, message: message.trim().to_owned() }.into());
        }
        let payload = response
            .body_mut()
            .read_json::<Value>()
            .with_context(|| format!("invalid JSON in the `{request}` response"))?;
        debug!(%status, "fetched");
        Ok(payload)
    }
}

fn into_api_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        error => ApiError::Transport(error.to_string()),
    }
}
