use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Role attached to an authenticated request by the upstream auth layer.
///
/// A typed enum with explicit capability methods, rather than string
/// comparisons scattered across route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    /// Admin and superadmin may list every order and mutate any order's
    /// status regardless of ownership.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }

    pub fn can_list_all_orders(self) -> bool {
        self.is_privileged()
    }

    pub fn can_update_order_status(self) -> bool {
        self.is_privileged()
    }

    pub fn can_manage_catalog(self) -> bool {
        self.is_privileged()
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(UnknownRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct UnknownRole;

/// Authenticated identity threaded explicitly through every lifecycle call.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}
