use clip_recorder_core::{Permission, PermissionGate, PermissionGrant, ServiceError, ServiceResult};

use std::panic::Location;

use async_trait::async_trait;
use cpal::traits::HostTrait;
use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

#[cfg(target_os = "macos")]
const PRIVACY_SETTINGS_URL: Option<&str> =
    Some("x-apple.systempreferences:com.apple.preference.security?Privacy_Microphone");
#[cfg(target_os = "windows")]
const PRIVACY_SETTINGS_URL: Option<&str> = Some("ms-settings:privacy-microphone");
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PRIVACY_SETTINGS_URL: Option<&str> = None;

/// Desktop hosts have no runtime permission prompt. Microphone access is
/// reported as granted when an input device exists; the OS prompts on
/// first capture where it needs to.
#[derive(Debug, Default)]
pub(crate) struct DesktopPermissionGate;

#[async_trait]
impl PermissionGate for DesktopPermissionGate {
    #[instrument(skip(self))]
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> ServiceResult<Vec<(Permission, PermissionGrant)>> {
        let has_input =
            tokio::task::spawn_blocking(|| cpal::default_host().default_input_device().is_some())
                .await
                .map_err(|e| ServiceError::Permission {
                    reason: format!("Device query failed: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        if !has_input {
            warn!("No input device, reporting microphone as denied");
        }

        Ok(permissions
            .iter()
            .map(|permission| {
                let grant = match permission {
                    Permission::Microphone if !has_input => PermissionGrant::Denied,
                    _ => PermissionGrant::Granted,
                };
                (*permission, grant)
            })
            .collect())
    }

    async fn open_settings(&self) -> ServiceResult<()> {
        let Some(url) = PRIVACY_SETTINGS_URL else {
            return Err(ServiceError::Unsupported {
                capability: "open_settings",
                location: ErrorLocation::from(Location::caller()),
            });
        };

        open::that(url).map_err(|e| ServiceError::Permission {
            reason: format!("Failed to open settings: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(url, "Opened privacy settings");
        Ok(())
    }
}
