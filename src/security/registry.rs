//! Path prefix permission registry.
//!
//! # Responsibilities
//! - Store admin and user path prefixes in insertion order
//! - Classify a request path as admin, user or public
//! - Reset to "everything public" on demand
//!
//! # Design Decisions
//! - Admin prefixes are checked before user prefixes
//! - Duplicate prefixes are ignored (set semantics, stable order)
//! - One RwLock over both sets so `clear` is atomic for readers

use std::fmt;
use std::sync::RwLock;

/// Access level required by a path, or granted to a caller.
///
/// Ordered so that `granted >= required` means access is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Public,
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Public => write!(f, "public"),
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Prefixes {
    admin: Vec<String>,
    user: Vec<String>,
}

fn insert_unique(set: &mut Vec<String>, prefix: String) {
    if !set.contains(&prefix) {
        set.push(prefix);
    }
}

/// Thread-safe registry of protected path prefixes.
#[derive(Debug)]
pub struct PermissionRegistry {
    prefixes: RwLock<Prefixes>,
}

impl PermissionRegistry {
    /// Registry with the stock prefixes: `/admin` for admins, `/repo` and
    /// `/data` for users.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.add_admin_prefix("/admin");
        registry.add_user_prefix("/repo");
        registry.add_user_prefix("/data");
        registry
    }

    /// Registry where every path is public.
    pub fn empty() -> Self {
        Self {
            prefixes: RwLock::new(Prefixes::default()),
        }
    }

    /// Remove every prefix. Idempotent.
    pub fn clear(&self) {
        let mut prefixes = self.prefixes.write().unwrap_or_else(|e| e.into_inner());
        prefixes.admin.clear();
        prefixes.user.clear();
    }

    pub fn add_admin_prefix(&self, prefix: impl Into<String>) {
        let mut prefixes = self.prefixes.write().unwrap_or_else(|e| e.into_inner());
        insert_unique(&mut prefixes.admin, prefix.into());
    }

    pub fn add_user_prefix(&self, prefix: impl Into<String>) {
        let mut prefixes = self.prefixes.write().unwrap_or_else(|e| e.into_inner());
        insert_unique(&mut prefixes.user, prefix.into());
    }

    /// Role required to access `path`.
    pub fn role(&self, path: &str) -> Role {
        let prefixes = self.prefixes.read().unwrap_or_else(|e| e.into_inner());
        if prefixes.admin.iter().any(|p| path.starts_with(p.as_str())) {
            Role::Admin
        } else if prefixes.user.iter().any(|p| path.starts_with(p.as_str())) {
            Role::User
        } else {
            Role::Public
        }
    }

    /// Admin prefixes in registration order.
    pub fn admin_prefixes(&self) -> Vec<String> {
        self.prefixes.read().unwrap_or_else(|e| e.into_inner()).admin.clone()
    }

    /// User prefixes in registration order.
    pub fn user_prefixes(&self) -> Vec<String> {
        self.prefixes.read().unwrap_or_else(|e| e.into_inner()).user.clone()
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_makes_everything_public() {
        let registry = PermissionRegistry::new();
        assert_eq!(registry.role("/admin/panel"), Role::Admin);

        registry.clear();
        registry.clear();
        for path in ["/", "/admin", "/admin/panel", "/repo/x", "/data", "/anything"] {
            assert_eq!(registry.role(path), Role::Public, "path {}", path);
        }
        assert!(registry.admin_prefixes().is_empty());
        assert!(registry.user_prefixes().is_empty());
    }

    #[test]
    fn test_user_prefix_after_clear() {
        let registry = PermissionRegistry::new();
        registry.clear();
        registry.add_user_prefix("/x");

        assert_eq!(registry.role("/x/y"), Role::User);
        assert_eq!(registry.role("/z"), Role::Public);
    }

    #[test]
    fn test_admin_wins_over_user() {
        let registry = PermissionRegistry::empty();
        registry.add_user_prefix("/x");
        registry.add_admin_prefix("/x");

        assert_eq!(registry.role("/x"), Role::Admin);
        assert_eq!(registry.role("/x/deeper"), Role::Admin);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let registry = PermissionRegistry::empty();
        registry.add_user_prefix("/b");
        registry.add_user_prefix("/a");
        registry.add_user_prefix("/b");

        assert_eq!(registry.user_prefixes(), vec!["/b".to_string(), "/a".to_string()]);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::User);
        assert!(Role::User > Role::Public);
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
