//! Shared HTTP client
//!
//! Routing and geocoding requests go through one connection pool.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};

static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent())
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to a default HTTP client: {e}");
            Client::new()
        })
});

/// `campus-route/<version>`
pub fn user_agent() -> String {
    format!("campus-route/{}", env!("CAMPUS_ROUTE_VERSION"))
}

/// Handle to the process-wide client; clones share the pool
pub fn shared_client() -> Client {
    GLOBAL_CLIENT.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        assert_eq!(
            user_agent(),
            format!("campus-route/{}", env!("CARGO_PKG_VERSION"))
        );
    }
}
