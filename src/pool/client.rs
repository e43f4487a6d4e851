//! Outbound HTTP client pool.
//!
//! Purely an allocation-avoidance pool: handles carry no destination
//! affinity, no health state, and no retry policy. Retries belong to the
//! caller.

use std::ops::Deref;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::pool::{Pool, Pooled, Reusable};

/// A reusable outbound client handle.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a client from the outbound client settings.
    pub fn new(config: &ClientConfig) -> Self {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { inner }
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl Reusable for HttpClient {
    // Stateless between calls.
    fn reset(&mut self) {}
}

/// Pool of [`HttpClient`] handles.
#[derive(Debug, Clone)]
pub struct ClientPool {
    pool: Pool<HttpClient>,
}

impl ClientPool {
    /// Create a pool whose clients share `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            pool: Pool::new(move || HttpClient::new(&config)),
        }
    }

    /// Check out a client for one outbound call.
    pub fn acquire(&self) -> Pooled<HttpClient> {
        self.pool.acquire()
    }

    /// Hand a client back after the call.
    pub fn release(&self, client: Pooled<HttpClient>) {
        self.pool.release(client);
    }

    /// Clients currently idle in the pool.
    pub fn idle(&self) -> usize {
        self.pool.idle()
    }
}

impl Default for ClientPool {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
