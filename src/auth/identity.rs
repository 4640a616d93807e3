use std::collections::BTreeSet;

use serde::Serialize;

use crate::database::models::User;

/// Capabilities an authenticated identity may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    TopicRead,
    TopicWrite,
    ReplyWrite,
}

/// Explicit permission flags, computed once when a request is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Permissions(BTreeSet<Permission>);

impl Permissions {
    /// The set every registered forum member receives.
    pub fn member() -> Self {
        [Permission::TopicRead, Permission::TopicWrite, Permission::ReplyWrite]
            .into_iter()
            .collect()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Authenticated user context attached to a request by the auth middleware.
#[derive(Clone, Debug, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub permissions: Permissions,
}

impl Identity {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            permissions: Permissions::member(),
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }
}
