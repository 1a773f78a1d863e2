//! The recognition backend as seen by the capture loop.

use async_trait::async_trait;

use presence_client::{PresenceApi, PresenceApiError};
use presence_core::correlation::CorrelationId;
use presence_core::detection::DetectionResult;

/// Face recognition and identity lookup.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Submit one encoded frame and return the faces found in it.
    async fn recognize(
        &self,
        correlation_id: CorrelationId,
        image_base64: &str,
    ) -> Result<Vec<DetectionResult>, PresenceApiError>;

    /// Display name of an enrolled subject, if the backend has one.
    async fn subject_name(&self, subject_id: &str) -> Result<Option<String>, PresenceApiError>;

    /// Display name of a visitor, if the backend has one.
    async fn visitor_name(&self, visitor_id: &str) -> Result<Option<String>, PresenceApiError>;
}

#[async_trait]
impl Recognizer for PresenceApi {
    async fn recognize(
        &self,
        correlation_id: CorrelationId,
        image_base64: &str,
    ) -> Result<Vec<DetectionResult>, PresenceApiError> {
        PresenceApi::recognize(self, correlation_id, image_base64).await
    }

    async fn subject_name(&self, subject_id: &str) -> Result<Option<String>, PresenceApiError> {
        self.user_name(subject_id).await
    }

    async fn visitor_name(&self, visitor_id: &str) -> Result<Option<String>, PresenceApiError> {
        PresenceApi::visitor_name(self, visitor_id).await
    }
}
