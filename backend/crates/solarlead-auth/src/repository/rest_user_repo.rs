//! User store reads over the PostgREST interface next to the hosted auth
//! service. Uses the service key, never the public one.

use super::user_repo::UserRepository;
use crate::errors::{AuthError, AuthResult};
use serde::Deserialize;
use solarlead_commons::{Role, UserAccess, UserId};
use solarlead_configs::IdentitySettings;

#[derive(Debug, Deserialize)]
struct AccessRow {
    role: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

impl AccessRow {
    fn into_access(self, user_id: &UserId) -> AuthResult<UserAccess> {
        let raw = self.role.unwrap_or_default();
        let role = Role::from_str_opt(&raw).ok_or_else(|| {
            AuthError::LookupError(format!("user {} has unknown role '{}'", user_id, raw))
        })?;
        // A NULL flag never grants access.
        Ok(UserAccess::new(role, self.is_active.unwrap_or(false)))
    }
}

#[derive(Debug, Clone)]
pub struct RestUserRepository {
    http: reqwest::Client,
    table_url: String,
    service_key: String,
}

impl RestUserRepository {
    pub fn new(settings: &IdentitySettings) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| AuthError::LookupError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self::with_client(
            http,
            &settings.base_url,
            &settings.users_table,
            &settings.service_key,
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, table: &str, service_key: &str) -> Self {
        Self {
            http,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            service_key: service_key.to_string(),
        }
    }

    fn get(&self) -> reqwest::RequestBuilder {
        self.http
            .get(&self.table_url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait::async_trait]
impl UserRepository for RestUserRepository {
    async fn get_user_access(&self, user_id: &UserId) -> AuthResult<UserAccess> {
        let id_filter = format!("eq.{}", user_id);
        let response = self
            .get()
            .query(&[("id", id_filter.as_str()), ("select", "role,is_active")])
            .send()
            .await
            .map_err(|e| AuthError::LookupError(format!("user store unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::LookupError(format!("user store returned {}", status)));
        }

        let rows: Vec<AccessRow> = response
            .json()
            .await
            .map_err(|e| AuthError::LookupError(format!("malformed user row: {}", e)))?;

        match rows.into_iter().next() {
            Some(row) => row.into_access(user_id),
            None => Err(AuthError::UserNotFound(format!("no user record for {}", user_id))),
        }
    }
}
