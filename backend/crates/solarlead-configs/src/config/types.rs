use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub phone_otp: PhoneOtpSettings,
    #[serde(default, alias = "authentication")]
    pub auth: AuthSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub security: SecuritySettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides
    /// [logging.targets]
    /// reqwest = "warn"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

/// Primary hosted identity provider and the user store living next to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Project URL, e.g. "https://abcd.example.co". Auth lives under /auth/v1,
    /// table reads under /rest/v1.
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
    /// Public (anon) API key sent with every auth call.
    #[serde(default)]
    pub anon_key: String,
    /// Service key used for role lookups. Never exposed to browsers.
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_users_table")]
    pub users_table: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            base_url: default_identity_base_url(),
            anon_key: String::new(),
            service_key: String::new(),
            users_table: default_users_table(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Secondary provider used only for phone one-time passwords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneOtpSettings {
    /// When false, phone OTPs go through the primary provider's SMS channel.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_phone_otp_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Provider name presented to the primary provider's id_token grant.
    #[serde(default = "default_id_token_provider")]
    pub id_token_provider: String,
}

impl Default for PhoneOtpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_phone_otp_base_url(),
            api_key: String::new(),
            id_token_provider: default_id_token_provider(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Whether session cookies require HTTPS (default: true)
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
    /// Prefix applied to bare national phone numbers.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    #[serde(default = "default_otp_sends_per_ip_per_minute")]
    pub otp_sends_per_ip_per_minute: u32,
    #[serde(default = "default_otp_sends_per_target_per_hour")]
    pub otp_sends_per_target_per_hour: u32,
    /// Code guesses allowed per client and per target; each verify attempt counts.
    #[serde(default = "default_otp_verifies_per_ip_per_minute")]
    pub otp_verifies_per_ip_per_minute: u32,
    #[serde(default = "default_otp_verifies_per_target_per_hour")]
    pub otp_verifies_per_target_per_hour: u32,
    #[serde(default = "default_rate_limit_cache_max_entries")]
    pub rate_limit_cache_max_entries: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            cookie_secure: true,
            cookie_domain: None,
            cookie_max_age_days: default_cookie_max_age_days(),
            default_country_code: default_country_code(),
            otp_sends_per_ip_per_minute: default_otp_sends_per_ip_per_minute(),
            otp_sends_per_target_per_hour: default_otp_sends_per_target_per_hour(),
            otp_verifies_per_ip_per_minute: default_otp_verifies_per_ip_per_minute(),
            otp_verifies_per_target_per_hour: default_otp_verifies_per_target_per_hour(),
            rate_limit_cache_max_entries: default_rate_limit_cache_max_entries(),
        }
    }
}

/// Static route table consumed by the access gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    /// Framework assets, API and static files. Never gated.
    #[serde(default = "default_asset_prefixes")]
    pub asset_prefixes: Vec<String>,
    /// Public sections. "/" matches only the home page.
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,
    /// Referral partner dashboard.
    #[serde(default = "default_user_prefix")]
    pub user_prefix: String,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            asset_prefixes: default_asset_prefixes(),
            public_prefixes: default_public_prefixes(),
            user_prefix: default_user_prefix(),
            admin_prefix: default_admin_prefix(),
            login_path: default_login_path(),
        }
    }
}

/// Pre-built marketing site served behind the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_root")]
    pub root_dir: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            root_dir: default_site_root(),
            index_file: default_index_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecuritySettings {
    #[serde(default)]
    pub cors: CorsSettings,
}

/// CORS configuration that maps directly to actix-cors options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins. Empty = same-origin only (no CORS headers emitted).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,
    /// Allow credentials (cookies). Default: true
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            allow_credentials: true,
            max_age: default_cors_max_age(),
        }
    }
}
