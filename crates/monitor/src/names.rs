//! Display-name resolution for detected faces.
//!
//! Lookups run concurrently, one per face. A failed or empty lookup
//! never fails the tick: the face falls back to a short id-derived label.

use futures::future::join_all;

use presence_core::detection::{DetectionEntry, DetectionResult, Identity};

use crate::recognizer::Recognizer;

/// Name for one identity, or its fallback label.
///
/// Unresolved faces have nothing to look up and get `None`.
pub async fn resolve_name(recognizer: &dyn Recognizer, identity: &Identity) -> Option<String> {
    let lookup = match identity {
        Identity::Subject(id) => recognizer.subject_name(id).await,
        Identity::Visitor(id) => recognizer.visitor_name(id).await,
        Identity::Unresolved => return None,
    };

    match lookup {
        Ok(Some(name)) => Some(name),
        Ok(None) => identity.fallback_name(),
        Err(e) => {
            tracing::warn!(?identity, error = %e, "Name lookup failed, using fallback label");
            identity.fallback_name()
        }
    }
}

/// Build the detected list for one tick, preserving result order.
pub async fn resolve_entries(
    recognizer: &dyn Recognizer,
    detections: &[DetectionResult],
) -> Vec<DetectionEntry> {
    let names = join_all(
        detections
            .iter()
            .map(|detection| resolve_name(recognizer, &detection.identity)),
    )
    .await;

    detections
        .iter()
        .zip(names)
        .enumerate()
        .map(|(index, (detection, name))| DetectionEntry::new(index, detection, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use presence_client::PresenceApiError;
    use presence_core::correlation::CorrelationId;
    use presence_core::detection::SubjectKind;
    use presence_core::geometry::BoundingBox;

    /// Knows subject `abc123` by name; every visitor lookup fails.
    struct Directory;

    #[async_trait]
    impl Recognizer for Directory {
        async fn recognize(
            &self,
            _correlation_id: CorrelationId,
            _image_base64: &str,
        ) -> Result<Vec<DetectionResult>, PresenceApiError> {
            Ok(Vec::new())
        }

        async fn subject_name(&self, id: &str) -> Result<Option<String>, PresenceApiError> {
            Ok((id == "abc123").then(|| "Ayu Lestari".to_string()))
        }

        async fn visitor_name(&self, _id: &str) -> Result<Option<String>, PresenceApiError> {
            Err(PresenceApiError::ApiError {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    fn detection(identity: Identity, similarity: Option<f64>) -> DetectionResult {
        DetectionResult {
            identity,
            similarity,
            bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    #[tokio::test]
    async fn known_subject_uses_backend_name() {
        let name = resolve_name(&Directory, &Identity::Subject("abc123".into())).await;
        assert_eq!(name.as_deref(), Some("Ayu Lestari"));
    }

    #[tokio::test]
    async fn nameless_subject_falls_back_to_id_prefix() {
        let name = resolve_name(&Directory, &Identity::Subject("0123456789abcdef".into())).await;
        assert_eq!(name.as_deref(), Some("User 01234567"));
    }

    #[tokio::test]
    async fn failed_visitor_lookup_falls_back() {
        let name = resolve_name(&Directory, &Identity::Visitor("v1".into())).await;
        assert_eq!(name.as_deref(), Some("Visitor v1"));
    }

    #[tokio::test]
    async fn entries_keep_result_order() {
        let detections = vec![
            detection(Identity::Subject("abc123".into()), Some(0.042)),
            detection(Identity::Visitor("v1".into()), None),
            detection(Identity::Unresolved, Some(0.5)),
        ];
        let entries = resolve_entries(&Directory, &detections).await;

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "Ayu Lestari");
        assert_eq!(entries[0].kind, SubjectKind::Student);
        assert_eq!(entries[0].similarity, "0.042");
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].kind, SubjectKind::Visitor);
        assert_eq!(entries[1].similarity, "NULL");
        assert_eq!(entries[2].name, "");
        assert_eq!(entries[2].kind, SubjectKind::Visitor);
    }
}
