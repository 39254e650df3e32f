use super::types::ServerConfig;
use log::warn;
use std::fs;
use std::path::Path;

impl ServerConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            warn!("{} not found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    /// Apply `SOLARLEAD_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SOLARLEAD_HOST") {
            self.server.host = host;
        }

        if let Some(port_str) = lookup("SOLARLEAD_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid SOLARLEAD_PORT value: {}", port_str))?;
        }

        if let Some(level) = lookup("SOLARLEAD_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(path) = lookup("SOLARLEAD_LOGS_PATH") {
            self.logging.logs_path = path;
        }

        // Provider credentials are expected to come from the environment in production
        if let Some(url) = lookup("SOLARLEAD_IDENTITY_URL") {
            self.identity.base_url = url;
        }

        if let Some(key) = lookup("SOLARLEAD_IDENTITY_ANON_KEY") {
            self.identity.anon_key = key;
        }

        if let Some(key) = lookup("SOLARLEAD_IDENTITY_SERVICE_KEY") {
            self.identity.service_key = key;
        }

        if let Some(enabled) = lookup("SOLARLEAD_PHONE_OTP_ENABLED") {
            self.phone_otp.enabled = parse_bool("SOLARLEAD_PHONE_OTP_ENABLED", &enabled)?;
        }

        if let Some(key) = lookup("SOLARLEAD_PHONE_OTP_API_KEY") {
            self.phone_otp.api_key = key;
        }

        if let Some(secure) = lookup("SOLARLEAD_COOKIE_SECURE") {
            self.auth.cookie_secure = parse_bool("SOLARLEAD_COOKIE_SECURE", &secure)?;
        }

        if let Some(dir) = lookup("SOLARLEAD_SITE_DIR") {
            self.site.root_dir = dir;
        }

        Ok(())
    }

    /// Validate configuration after environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.identity.base_url = self.identity.base_url.trim_end_matches('/').to_string();
        self.phone_otp.base_url = self.phone_otp.base_url.trim_end_matches('/').to_string();

        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !valid_levels.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    valid_levels.join(", ")
                ));
            }
        }

        if self.identity.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("identity.base_url cannot be empty"));
        }

        if self.identity.request_timeout_ms == 0 {
            return Err(anyhow::anyhow!("identity.request_timeout_ms cannot be 0"));
        }

        if self.phone_otp.enabled && self.phone_otp.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "phone_otp.enabled requires phone_otp.api_key (or SOLARLEAD_PHONE_OTP_API_KEY)"
            ));
        }

        if !self.auth.default_country_code.starts_with('+')
            || self.auth.default_country_code.len() < 2
            || !self.auth.default_country_code[1..].chars().all(|c| c.is_ascii_digit())
        {
            return Err(anyhow::anyhow!(
                "auth.default_country_code must look like '+91', got '{}'",
                self.auth.default_country_code
            ));
        }

        if self.auth.cookie_max_age_days <= 0 {
            return Err(anyhow::anyhow!("auth.cookie_max_age_days must be positive"));
        }

        let routes = &self.routes;
        let all_paths = routes
            .asset_prefixes
            .iter()
            .chain(routes.public_prefixes.iter())
            .chain([&routes.user_prefix, &routes.admin_prefix, &routes.login_path]);
        for path in all_paths {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!("Route '{}' must start with '/'", path));
            }
        }

        if routes.user_prefix == "/" || routes.admin_prefix == "/" {
            return Err(anyhow::anyhow!("Gated prefixes cannot be '/'"));
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid {} value: {}", key, other)),
    }
}
