//! Wire messages exchanged with the recognition backend.
//!
//! Frame submissions go to `POST /face/uploadmany` as
//! `{"class_id": "...", "image_base64": "..."}` and come back as
//! `{"status": "success", "results": [...]}`. Name lookups return a
//! document with an optional `name` field.

use presence_core::correlation::CorrelationId;
use presence_core::detection::{DetectionResult, Identity};
use presence_core::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// Status value the backend uses for a completed recognition pass.
pub const STATUS_SUCCESS: &str = "success";

/// Body of a frame submission.
#[derive(Debug, Serialize)]
pub struct UploadManyRequest<'a> {
    /// Per-tick correlation id. The field keeps its historical name.
    pub class_id: CorrelationId,
    /// JPEG bytes, standard base64 without a data-URL prefix.
    pub image_base64: &'a str,
}

/// Response to a frame submission.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadManyResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<RawDetection>,
}

impl UploadManyResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Detections of a successful pass; empty for any other status.
    pub fn into_detections(self) -> Vec<DetectionResult> {
        if !self.is_success() {
            return Vec::new();
        }
        self.results.into_iter().map(DetectionResult::from).collect()
    }
}

/// One face as the backend reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub visitor_id: Option<String>,
    /// `null` for a newly seen visitor.
    #[serde(default)]
    pub distance: Option<f64>,
    pub bounding_box: BoundingBox,
}

impl From<RawDetection> for DetectionResult {
    fn from(raw: RawDetection) -> Self {
        Self {
            identity: Identity::from_ids(raw.user_id, raw.visitor_id),
            similarity: raw.distance,
            bounding_box: raw.bounding_box,
        }
    }
}

/// Subject or visitor document. Only the name is used.
#[derive(Debug, Clone, Deserialize)]
pub struct NameResponse {
    #[serde(default)]
    pub name: Option<String>,
}

impl NameResponse {
    /// The name, treating an empty string as missing.
    pub fn into_name(self) -> Option<String> {
        self.name.filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_with_subject_and_visitor() {
        let json = r#"{
            "status": "success",
            "results": [
                {"user_id": "abc123", "distance": 0.042, "bounding_box": {"x": 10, "y": 20, "width": 30, "height": 40}},
                {"visitor_id": "v1", "distance": null, "bounding_box": {"x": 1.5, "y": 2.5, "width": 3, "height": 4}}
            ]
        }"#;
        let resp: UploadManyResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());

        let detections = resp.into_detections();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].identity, Identity::Subject("abc123".into()));
        assert_eq!(detections[0].similarity, Some(0.042));
        assert_eq!(detections[0].bounding_box, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(detections[1].identity, Identity::Visitor("v1".into()));
        assert_eq!(detections[1].similarity, None);
        assert!(detections[1].is_new_visitor());
    }

    #[test]
    fn missing_distance_is_none() {
        let json = r#"{"visitor_id": "v2", "bounding_box": {"x": 0, "y": 0, "width": 1, "height": 1}}"#;
        let raw: RawDetection = serde_json::from_str(json).unwrap();
        assert_eq!(raw.distance, None);
    }

    #[test]
    fn non_success_status_yields_no_detections() {
        let json = r#"{"status": "error", "results": [
            {"user_id": "u", "distance": 0.1, "bounding_box": {"x": 0, "y": 0, "width": 1, "height": 1}}
        ]}"#;
        let resp: UploadManyResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_success());
        assert!(resp.into_detections().is_empty());
    }

    #[test]
    fn missing_results_defaults_to_empty() {
        let resp: UploadManyResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(resp.into_detections().is_empty());
    }

    #[test]
    fn upload_request_shape() {
        let class_id = CorrelationId::new();
        let req = UploadManyRequest {
            class_id,
            image_base64: "aGVsbG8=",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["class_id"], class_id.to_string());
        assert_eq!(json["image_base64"], "aGVsbG8=");
    }

    #[test]
    fn name_response_ignores_empty_name() {
        let resp: NameResponse = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(resp.into_name(), None);
        let resp: NameResponse = serde_json::from_str(r#"{"_id": "x"}"#).unwrap();
        assert_eq!(resp.into_name(), None);
        let resp: NameResponse = serde_json::from_str(r#"{"name": "Budi"}"#).unwrap();
        assert_eq!(resp.into_name().as_deref(), Some("Budi"));
    }
}
