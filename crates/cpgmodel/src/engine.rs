//! HTTP client for a Joern server
//!
//! Queries go to `POST /query-sync` as `{"query": ...}` and are answered with
//! `{"success", "stdout", "stderr"}`. Requests have no timeout: large projects
//! can keep a single query busy for minutes.

use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use cpgmodel_api::{ExtractError, ExtractResult, QueryEngine, QueryResponse, RetryPolicy};
use log::{debug, info};

/// Path of the synchronous query endpoint
const QUERY_PATH: &str = "/query-sync";

#[derive(Debug)]
pub struct JoernClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl JoernClient {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:8080`)
    pub fn new(base_url: &str) -> ExtractResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ExtractError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Wait for the server at `host:port` to accept connections, then build a client.
    ///
    /// # Errors
    /// `ConnectTimeout` once `policy.max_attempts` connection attempts failed.
    pub fn connect(host: &str, port: u16, policy: &RetryPolicy) -> ExtractResult<Self> {
        let address = format!("{host}:{port}");
        wait_until_reachable(&address, policy)?;
        info!("Connected to Joern server at {}", address);
        Self::new(&format!("http://{address}"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn wait_until_reachable(address: &str, policy: &RetryPolicy) -> ExtractResult<()> {
    for attempt in 0..policy.max_attempts {
        match TcpStream::connect(address) {
            Ok(_) => return Ok(()),
            Err(e) => {
                let delay = policy.delay_for(attempt);
                debug!(
                    "Joern server at {} not reachable (attempt {}/{}): {}",
                    address,
                    attempt + 1,
                    policy.max_attempts,
                    e
                );
                if attempt + 1 < policy.max_attempts {
                    thread::sleep(delay);
                }
            }
        }
    }
    Err(ExtractError::ConnectTimeout {
        endpoint: address.to_string(),
        attempts: policy.max_attempts,
    })
}

impl QueryEngine for JoernClient {
    fn execute(&mut self, query: &str) -> ExtractResult<QueryResponse> {
        let url = format!("{}{}", self.base_url, QUERY_PATH);
        let body = serde_json::json!({ "query": query });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ExtractError::Transport(format!("Joern request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ExtractError::Transport(format!(
                "Joern returned status {}",
                response.status()
            )));
        }

        response
            .json::<QueryResponse>()
            .map_err(|e| ExtractError::Transport(format!("Joern response parse error: {e}")))
    }
}
