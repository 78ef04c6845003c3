use crate::{
    error::ServiceResult,
    platform::{Permission, PermissionGrant},
};

use async_trait::async_trait;

/// Host permission prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Ask for every permission in `permissions` and report each result.
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> ServiceResult<Vec<(Permission, PermissionGrant)>>;

    /// Send the user to the system settings page for this app.
    async fn open_settings(&self) -> ServiceResult<()>;
}
