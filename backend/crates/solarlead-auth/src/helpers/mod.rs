pub mod cookie;
pub mod ip_extractor;

pub use cookie::{
    clear_session, store_session, CookieConfig, CookieMutation, SessionCookies,
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};
pub use ip_extractor::extract_client_ip;
