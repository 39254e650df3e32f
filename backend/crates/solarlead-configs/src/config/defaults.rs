// Default value functions

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_workers() -> usize {
    0 // 0 = one worker per CPU
}

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_identity_base_url() -> String {
    "http://127.0.0.1:54321".to_string()
}

pub fn default_users_table() -> String {
    "users".to_string()
}

pub fn default_request_timeout_ms() -> u64 {
    5000
}

pub fn default_phone_otp_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

pub fn default_id_token_provider() -> String {
    "firebase".to_string()
}

pub fn default_cookie_max_age_days() -> i64 {
    7
}

pub fn default_country_code() -> String {
    "+91".to_string()
}

pub fn default_otp_sends_per_ip_per_minute() -> u32 {
    5
}

pub fn default_otp_sends_per_target_per_hour() -> u32 {
    5
}

pub fn default_otp_verifies_per_ip_per_minute() -> u32 {
    10
}

pub fn default_otp_verifies_per_target_per_hour() -> u32 {
    10
}

pub fn default_rate_limit_cache_max_entries() -> u64 {
    100_000
}

pub fn default_asset_prefixes() -> Vec<String> {
    vec!["/_assets".to_string(), "/api".to_string(), "/static".to_string()]
}

pub fn default_public_prefixes() -> Vec<String> {
    [
        "/",
        "/about",
        "/services",
        "/subsidy",
        "/gallery",
        "/blog",
        "/contact",
        "/auth",
        "/leads-dashboard",
        "/faq",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

pub fn default_user_prefix() -> String {
    "/dashboard".to_string()
}

pub fn default_admin_prefix() -> String {
    "/admin".to_string()
}

pub fn default_login_path() -> String {
    "/auth/login".to_string()
}

pub fn default_site_root() -> String {
    "./site".to_string()
}

pub fn default_index_file() -> String {
    "index.html".to_string()
}

pub fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "OPTIONS"].iter().map(|m| m.to_string()).collect()
}

pub fn default_cors_headers() -> Vec<String> {
    ["Content-Type", "Accept", "Origin", "X-Requested-With"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn default_cors_max_age() -> u64 {
    3600 // 1 hour
}
