use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role stored in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Referral partner.
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// Admin and super admin both reach the admin area.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_str_opt(s).ok_or_else(|| format!("Invalid Role: {}", s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The subset of a user row the access gate consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccess {
    pub role: Role,
    pub is_active: bool,
}

impl UserAccess {
    pub fn new(role: Role, is_active: bool) -> Self {
        Self { role, is_active }
    }

    /// True when this user may enter the admin area.
    #[inline]
    pub fn can_enter_admin(&self) -> bool {
        self.is_active && self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str_opt("user"), Some(Role::User));
        assert_eq!(Role::from_str_opt(" Admin "), Some(Role::Admin));
        assert_eq!(Role::from_str_opt("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::from_str_opt("partner"), None);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_matches_column_values() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_admin_entry_requires_active_admin() {
        assert!(UserAccess::new(Role::Admin, true).can_enter_admin());
        assert!(UserAccess::new(Role::SuperAdmin, true).can_enter_admin());
        assert!(!UserAccess::new(Role::Admin, false).can_enter_admin());
        assert!(!UserAccess::new(Role::User, true).can_enter_admin());
    }
}
