//! Route classification.
//!
//! Order matters: static assets, then the public allow-list, then the gated
//! areas. A path that matches nothing is public and the site answers it (404).
//! A trailing directory index file (`/dashboard/index.html`) is classified as
//! its directory, since the site serves both from the same file.

use solarlead_configs::RouteSettings;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Public,
    StaticAsset,
    /// Referral partner dashboard.
    UserArea,
    AdminArea,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Public => "public",
            RouteClass::StaticAsset => "static_asset",
            RouteClass::UserArea => "user_area",
            RouteClass::AdminArea => "admin_area",
        }
    }

    pub fn is_gated(&self) -> bool {
        matches!(self, RouteClass::UserArea | RouteClass::AdminArea)
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static route table, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    asset_prefixes: Vec<String>,
    public_prefixes: Vec<String>,
    user_prefix: String,
    admin_prefix: String,
    login_path: String,
    index_file: String,
}

impl RouteTable {
    pub fn from_settings(settings: &RouteSettings) -> anyhow::Result<Self> {
        let table = Self {
            asset_prefixes: settings.asset_prefixes.clone(),
            public_prefixes: settings
                .public_prefixes
                .iter()
                .map(|p| trim_trailing_slash(p).to_string())
                .collect(),
            user_prefix: trim_trailing_slash(&settings.user_prefix).to_string(),
            admin_prefix: trim_trailing_slash(&settings.admin_prefix).to_string(),
            login_path: settings.login_path.clone(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        };

        let login_class = table.classify(&table.login_path);
        if login_class != RouteClass::Public {
            return Err(anyhow::anyhow!(
                "Login path '{}' is classified as {}; it must be public or redirects will loop",
                table.login_path,
                login_class
            ));
        }

        Ok(table)
    }

    /// Name of the file the site serves for directory paths.
    pub fn with_index_file(mut self, index_file: &str) -> Self {
        self.index_file = index_file.to_string();
        self
    }

    /// Classify a raw request path.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = self.strip_index_file(canonicalize_path(path));

        if self.is_static_asset(&path) {
            RouteClass::StaticAsset
        } else if self.is_public(&path) {
            RouteClass::Public
        } else if path.starts_with(&self.user_prefix) {
            RouteClass::UserArea
        } else if path.starts_with(&self.admin_prefix) {
            RouteClass::AdminArea
        } else {
            RouteClass::Public
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Where authenticated users land by default.
    pub fn user_home(&self) -> &str {
        &self.user_prefix
    }

    pub fn admin_home(&self) -> &str {
        &self.admin_prefix
    }

    /// Whether a path lies under the user or admin prefix, ignoring the
    /// static-asset rules.
    pub fn is_under_gated_prefix(&self, path: &str) -> bool {
        let path = canonicalize_path(path);
        !self.is_public(&path)
            && (path.starts_with(&self.user_prefix) || path.starts_with(&self.admin_prefix))
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    fn strip_index_file(&self, path: String) -> String {
        if let Some((dir, last)) = path.rsplit_once('/') {
            if !self.index_file.is_empty() && last.eq_ignore_ascii_case(&self.index_file) {
                return if dir.is_empty() { "/".to_string() } else { dir.to_string() };
            }
        }
        path
    }

    fn is_static_asset(&self, path: &str) -> bool {
        if self.asset_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return true;
        }
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        last_segment.contains('.')
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|entry| {
            if entry.is_empty() {
                // "/" after trimming: the home page only
                path == "/"
            } else {
                path == entry
                    || path
                        .strip_prefix(entry.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        })
    }
}

const DEFAULT_INDEX_FILE: &str = "index.html";

fn trim_trailing_slash(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Canonical form used for matching: percent-decoded once, empty and `.`
/// segments dropped, `..` resolved. Always starts with `/`; no trailing `/`.
pub fn canonicalize_path(path: &str) -> String {
    let decoded = percent_decode(path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_settings(&RouteSettings::default()).unwrap()
    }

    #[test]
    fn test_public_sections_and_subpaths() {
        let routes = table();
        for path in [
            "/",
            "/about",
            "/services/rooftop",
            "/subsidy",
            "/gallery/2024",
            "/blog/net-metering-explained",
            "/contact",
            "/auth/login",
            "/auth/callback",
            "/leads-dashboard",
            "/faq/",
        ] {
            assert_eq!(routes.classify(path), RouteClass::Public, "{}", path);
        }
    }

    #[test]
    fn test_allow_list_matching() {
        let routes = table();
        assert!(routes.is_public("/"));
        assert!(!routes.is_public("/dashboard"));
        assert!(!routes.is_public("/aboutus"));
        assert!(!routes.is_public("/blogadmin"));
        assert!(routes.is_public("/blog/admin"));
    }

    #[test]
    fn test_static_assets() {
        let routes = table();
        for path in [
            "/_assets/app.js",
            "/_assets/chunks/x",
            "/api/auth/me",
            "/static/fonts",
            "/favicon.ico",
            "/images/panel.webp",
            "/dashboard/export.csv",
            "/admin/logo.svg",
        ] {
            assert_eq!(routes.classify(path), RouteClass::StaticAsset, "{}", path);
        }
    }

    #[test]
    fn test_gated_areas() {
        let routes = table();
        assert_eq!(routes.classify("/dashboard"), RouteClass::UserArea);
        assert_eq!(routes.classify("/dashboard/leads/42"), RouteClass::UserArea);
        assert_eq!(routes.classify("/admin"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/admin/withdrawals"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/adminx"), RouteClass::AdminArea);
    }

    #[test]
    fn test_directory_index_file_is_classified_as_its_directory() {
        let routes = table();
        assert_eq!(routes.classify("/dashboard/index.html"), RouteClass::UserArea);
        assert_eq!(routes.classify("/dashboard/leads/INDEX.HTML"), RouteClass::UserArea);
        assert_eq!(routes.classify("/admin/index.html"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/%61dmin/./index.html"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/index.html"), RouteClass::Public);
        assert_eq!(routes.classify("/about/index.html"), RouteClass::Public);

        let routes = table().with_index_file("home.htm");
        assert_eq!(routes.classify("/admin/home.htm"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/admin/index.html"), RouteClass::StaticAsset);
    }

    #[test]
    fn test_under_gated_prefix() {
        let routes = table();
        assert!(routes.is_under_gated_prefix("/dashboard/leads.html"));
        assert!(routes.is_under_gated_prefix("/admin/logo.svg"));
        assert!(!routes.is_under_gated_prefix("/blog/admin.html"));
        assert!(!routes.is_under_gated_prefix("/gallery/panel.jpg"));
    }

    #[test]
    fn test_unclassified_is_public() {
        assert_eq!(table().classify("/careers"), RouteClass::Public);
    }

    #[test]
    fn test_encoded_and_dotted_admin_paths_are_gated() {
        let routes = table();
        assert_eq!(routes.classify("/%61dmin"), RouteClass::AdminArea);
        assert_eq!(routes.classify("//admin"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/about/../admin/users"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/./admin"), RouteClass::AdminArea);
        assert_eq!(routes.classify("/auth/..%2Fadmin"), RouteClass::AdminArea);
    }

    #[test]
    fn test_canonicalize_path() {
        assert_eq!(canonicalize_path(""), "/");
        assert_eq!(canonicalize_path("/"), "/");
        assert_eq!(canonicalize_path("/a//b/"), "/a/b");
        assert_eq!(canonicalize_path("/a/./b/../c"), "/a/c");
        assert_eq!(canonicalize_path("/../../x"), "/x");
        assert_eq!(canonicalize_path("/caf%C3%A9"), "/café");
        assert_eq!(canonicalize_path("/100%"), "/100%");
        assert_eq!(canonicalize_path("/%zz"), "/%zz");
    }

    #[test]
    fn test_login_path_must_be_public() {
        let mut settings = RouteSettings::default();
        settings.login_path = "/dashboard/login".to_string();
        assert!(RouteTable::from_settings(&settings).is_err());
    }

    #[test]
    fn test_homes() {
        let routes = table();
        assert_eq!(routes.user_home(), "/dashboard");
        assert_eq!(routes.admin_home(), "/admin");
        assert_eq!(routes.login_path(), "/auth/login");
    }
}
