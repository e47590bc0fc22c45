//! Per-request session and role resolution
//!
//! The token proves who the caller is; the role always comes from the
//! profile row. A missing profile is created as `user`, and any failure to
//! read or create it degrades to `user` so a broken lookup can never grant
//! admin rights.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, models::user::Role};

/// Verified identity taken from an access token
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Resolved caller, passed explicitly to every handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }

    /// Owner-or-admin gate for mutations
    pub fn ensure_can_modify(&self, owner_id: Uuid, what: &str) -> Result<(), ApiError> {
        if self.can_modify(owner_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Only the owner or an admin can change this {}",
                what
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

/// Profile storage seam, keyed by account id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_role(&self, user_id: Uuid) -> anyhow::Result<Option<Role>>;

    /// Insert a `user` profile unless one exists, then return the stored role
    async fn create_if_absent(&self, identity: &Identity) -> anyhow::Result<Role>;
}

pub async fn resolve_session(store: &dyn ProfileStore, identity: Identity) -> Session {
    let role = match store.find_role(identity.user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => match store.create_if_absent(&identity).await {
            Ok(role) => role,
            Err(e) => {
                warn!(
                    "Could not create profile for {}, continuing as user: {}",
                    identity.user_id, e
                );
                Role::User
            }
        },
        Err(e) => {
            warn!(
                "Profile lookup failed for {}, continuing as user: {}",
                identity.user_id, e
            );
            Role::User
        }
    };

    Session {
        user_id: identity.user_id,
        email: identity.email,
        display_name: identity.display_name,
        role,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// In-memory profile table
    #[derive(Default)]
    pub(crate) struct MemoryProfiles {
        pub roles: Mutex<HashMap<Uuid, Role>>,
        pub creations: Mutex<u32>,
    }

    #[async_trait]
    impl ProfileStore for MemoryProfiles {
        async fn find_role(&self, user_id: Uuid) -> anyhow::Result<Option<Role>> {
            Ok(self.roles.lock().await.get(&user_id).copied())
        }

        async fn create_if_absent(&self, identity: &Identity) -> anyhow::Result<Role> {
            let mut roles = self.roles.lock().await;
            *self.creations.lock().await += 1;
            Ok(*roles.entry(identity.user_id).or_insert(Role::User))
        }
    }

    /// Fails the lookup, or only the creation
    pub(crate) struct BrokenProfiles {
        pub lookup_fails: bool,
    }

    #[async_trait]
    impl ProfileStore for BrokenProfiles {
        async fn find_role(&self, _user_id: Uuid) -> anyhow::Result<Option<Role>> {
            if self.lookup_fails {
                anyhow::bail!("connection refused");
            }
            Ok(None)
        }

        async fn create_if_absent(&self, _identity: &Identity) -> anyhow::Result<Role> {
            anyhow::bail!("permission denied for table users")
        }
    }

    pub(crate) fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            display_name: "Ana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_existing_admin_profile_is_adopted() {
        let store = MemoryProfiles::default();
        let id = identity();
        store.roles.lock().await.insert(id.user_id, Role::Admin);

        let session = resolve_session(&store, id.clone()).await;
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.user_id, id.user_id);
        assert_eq!(*store.creations.lock().await, 0);
    }

    #[tokio::test]
    async fn test_missing_profile_created_as_user_once() {
        let store = MemoryProfiles::default();
        let id = identity();

        let first = resolve_session(&store, id.clone()).await;
        let second = resolve_session(&store, id.clone()).await;

        assert_eq!(first.role, Role::User);
        assert_eq!(second.role, Role::User);
        assert_eq!(store.roles.lock().await.len(), 1);
        assert_eq!(*store.creations.lock().await, 1);
    }

    #[tokio::test]
    async fn test_failures_resolve_to_user() {
        let lookup = resolve_session(&BrokenProfiles { lookup_fails: true }, identity()).await;
        assert_eq!(lookup.role, Role::User);

        let creation = resolve_session(&BrokenProfiles { lookup_fails: false }, identity()).await;
        assert_eq!(creation.role, Role::User);
        assert_eq!(creation.email, "ana@example.com");
    }

    #[test]
    fn test_permission_helpers() {
        let owner = Uuid::new_v4();
        let user = Session {
            user_id: Uuid::new_v4(),
            email: String::new(),
            display_name: String::new(),
            role: Role::User,
        };
        let admin = Session {
            role: Role::Admin,
            ..user.clone()
        };

        assert!(user.ensure_can_modify(user.user_id, "pet").is_ok());
        assert!(matches!(
            user.ensure_can_modify(owner, "pet"),
            Err(ApiError::Forbidden(_))
        ));
        assert!(admin.ensure_can_modify(owner, "pet").is_ok());
        assert!(user.require_admin().is_err());
        assert!(admin.require_admin().is_ok());
    }
}
