use std::fmt;

/// Final answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessVerdict {
    /// Continue to the matched handler.
    Allow,
    /// Send to the login page, optionally coming back to `return_to` afterwards.
    RedirectToLogin { return_to: Option<String> },
    RedirectTo(String),
    /// Only produced for JSON endpoints, which cannot follow a redirect.
    DenyAsUnauthorized,
}

impl AccessVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessVerdict::Allow => "allow",
            AccessVerdict::RedirectToLogin { .. } => "redirect_to_login",
            AccessVerdict::RedirectTo(_) => "redirect",
            AccessVerdict::DenyAsUnauthorized => "deny",
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, AccessVerdict::Allow)
    }

    /// `Location` header for redirect verdicts.
    pub fn location(&self, login_path: &str) -> Option<String> {
        match self {
            AccessVerdict::RedirectToLogin { return_to: None } => Some(login_path.to_string()),
            AccessVerdict::RedirectToLogin {
                return_to: Some(path),
            } => match serde_urlencoded::to_string([("redirect", path.as_str())]) {
                Ok(query) => Some(format!("{}?{}", login_path, query)),
                Err(e) => {
                    log::warn!("Dropping unencodable return path: {}", e);
                    Some(login_path.to_string())
                },
            },
            AccessVerdict::RedirectTo(target) => Some(target.clone()),
            AccessVerdict::Allow | AccessVerdict::DenyAsUnauthorized => None,
        }
    }
}

impl fmt::Display for AccessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessVerdict::RedirectToLogin {
                return_to: Some(path),
            } => write!(f, "redirect_to_login({})", path),
            AccessVerdict::RedirectTo(target) => write!(f, "redirect({})", target),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_location_encodes_return_path() {
        let verdict = AccessVerdict::RedirectToLogin {
            return_to: Some("/dashboard/leads?status=new&page=2".to_string()),
        };
        assert_eq!(
            verdict.location("/auth/login").as_deref(),
            Some("/auth/login?redirect=%2Fdashboard%2Fleads%3Fstatus%3Dnew%26page%3D2")
        );
    }

    #[test]
    fn test_login_location_without_return_path() {
        let verdict = AccessVerdict::RedirectToLogin { return_to: None };
        assert_eq!(verdict.location("/auth/login").as_deref(), Some("/auth/login"));
    }

    #[test]
    fn test_non_redirects_have_no_location() {
        assert_eq!(AccessVerdict::Allow.location("/auth/login"), None);
        assert_eq!(AccessVerdict::DenyAsUnauthorized.location("/auth/login"), None);
        assert_eq!(
            AccessVerdict::RedirectTo("/admin".into()).location("/auth/login").as_deref(),
            Some("/admin")
        );
    }
}
