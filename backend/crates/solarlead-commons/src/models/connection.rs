// Client connection details used for rate limiting

/// Connection information for an inbound request.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// IP address of the connecting client (as string from actix-web)
    pub remote_addr: Option<String>,
}

impl ConnectionInfo {
    pub fn new(remote_addr: Option<String>) -> Self {
        Self { remote_addr }
    }

    /// Key used for per-client buckets. Requests without an address share one bucket.
    pub fn client_key(&self) -> &str {
        self.remote_addr.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_uses_remote_addr() {
        let conn = ConnectionInfo::new(Some("192.168.1.100".to_string()));
        assert_eq!(conn.client_key(), "192.168.1.100");
    }

    #[test]
    fn test_missing_address_shares_key() {
        let conn = ConnectionInfo::new(None);
        assert_eq!(conn.client_key(), "unknown");
    }
}
