use async_trait::async_trait;

use super::LocationProvider;
use crate::error::LocationError;
use crate::models::Location;

/// A fixed, user-configured position.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation(pub Location);

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_position(&self) -> Result<Location, LocationError> {
        Ok(self.0)
    }
}

/// Stand-in for devices without any position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Location, LocationError> {
        Err(LocationError::Unsupported)
    }
}
