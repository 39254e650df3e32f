// Session cookie handling
//
// The access and refresh tokens issued by the identity provider travel in two
// HttpOnly cookies. Anything that wants to change them returns a list of
// `CookieMutation`s; only the HTTP layer turns those into `Set-Cookie` headers.

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::HttpMessage;
use solarlead_configs::AuthSettings;

/// Cookie name for the provider access token
pub const ACCESS_COOKIE_NAME: &str = "solarlead-access-token";

/// Cookie name for the provider refresh token
pub const REFRESH_COOKIE_NAME: &str = "solarlead-refresh-token";

/// Configuration for session cookies
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the Secure flag (should be true in production/HTTPS)
    pub secure: bool,
    /// Cookie path (default: "/")
    pub path: String,
    /// Lax so the cookie survives the top-level redirect back from login
    pub same_site: SameSite,
    /// Domain (None = current domain)
    pub domain: Option<String>,
    pub max_age: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            domain: None,
            max_age: Duration::days(7),
        }
    }
}

impl CookieConfig {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            secure: settings.cookie_secure,
            domain: settings.cookie_domain.clone(),
            max_age: Duration::days(settings.cookie_max_age_days),
            ..Default::default()
        }
    }
}

/// A change to the client's session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieMutation {
    Set { name: &'static str, value: String },
    Clear { name: &'static str },
}

impl CookieMutation {
    /// Build the concrete cookie for a response.
    pub fn to_cookie(&self, config: &CookieConfig) -> Cookie<'static> {
        let (name, value, clearing) = match self {
            CookieMutation::Set { name, value } => (*name, value.clone(), false),
            CookieMutation::Clear { name } => (*name, String::new(), true),
        };

        let mut builder = Cookie::build(name, value)
            .path(config.path.clone())
            .http_only(true)
            .secure(config.secure)
            .same_site(config.same_site);

        builder = if clearing {
            builder
                .max_age(Duration::ZERO)
                .expires(OffsetDateTime::UNIX_EPOCH)
        } else {
            builder.max_age(config.max_age)
        };

        let mut cookie = builder.finish();
        if let Some(ref domain) = config.domain {
            cookie.set_domain(domain.clone());
        }

        cookie
    }
}

/// Mutations that store a freshly issued token pair.
pub fn store_session(access_token: &str, refresh_token: &str) -> Vec<CookieMutation> {
    vec![
        CookieMutation::Set {
            name: ACCESS_COOKIE_NAME,
            value: access_token.to_string(),
        },
        CookieMutation::Set {
            name: REFRESH_COOKIE_NAME,
            value: refresh_token.to_string(),
        },
    ]
}

/// Mutations that remove both session cookies.
pub fn clear_session() -> Vec<CookieMutation> {
    vec![
        CookieMutation::Clear {
            name: ACCESS_COOKIE_NAME,
        },
        CookieMutation::Clear {
            name: REFRESH_COOKIE_NAME,
        },
    ]
}

/// Tokens carried by an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// Extract session tokens from an iterator over request cookies.
    pub fn from_cookies<'a, I>(cookies: I) -> Self
    where
        I: IntoIterator<Item = Cookie<'a>>,
    {
        let mut access_token = None;
        let mut refresh_token = None;
        for cookie in cookies {
            match cookie.name() {
                ACCESS_COOKIE_NAME if access_token.is_none() => {
                    access_token = Some(cookie.value().to_string())
                },
                REFRESH_COOKIE_NAME if refresh_token.is_none() => {
                    refresh_token = Some(cookie.value().to_string())
                },
                _ => {},
            }
        }
        Self::new(access_token, refresh_token)
    }

    /// Read the session cookies of an `HttpRequest` or `ServiceRequest`.
    ///
    /// Malformed pairs in the `Cookie` header are skipped.
    pub fn from_request<R: HttpMessage>(req: &R) -> Self {
        let cookies = req
            .headers()
            .get_all(header::COOKIE)
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| Cookie::parse_encoded(pair).ok());
        Self::from_cookies(cookies)
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}
