//! REST API client for the SmartPresence backend.
//!
//! Wraps the backend HTTP API (frame recognition, subject and visitor
//! lookup, class names, attendance reports) using [`reqwest`].

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use presence_core::attendance::{AttendanceReport, ManualReportQuery};
use presence_core::class_name::{extract_class_name, find_class_name};
use presence_core::correlation::CorrelationId;
use presence_core::detection::DetectionResult;
use reqwest::Url;

use crate::messages::{NameResponse, UploadManyRequest, UploadManyResponse};

/// HTTP client for one backend instance.
#[derive(Clone)]
pub struct PresenceApi {
    client: reqwest::Client,
    base_url: Url,
}

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum PresenceApiError {
    /// The HTTP request itself failed (network, DNS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot address backend endpoints.
    #[error("Invalid backend base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl PresenceApi {
    /// Create a client for the backend at `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Result<Self, PresenceApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, PresenceApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, PresenceApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| PresenceApiError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit one frame for recognition.
    ///
    /// Sends `POST /face/uploadmany` and returns the raw response.
    pub async fn upload_many(
        &self,
        class_id: CorrelationId,
        image_base64: &str,
    ) -> Result<UploadManyResponse, PresenceApiError> {
        let body = UploadManyRequest {
            class_id,
            image_base64,
        };

        let response = self
            .client
            .post(self.endpoint(&["face", "uploadmany"])?)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Submit one frame and return the faces found in it.
    ///
    /// A response whose status is not `"success"` yields no detections.
    pub async fn recognize(
        &self,
        class_id: CorrelationId,
        image_base64: &str,
    ) -> Result<Vec<DetectionResult>, PresenceApiError> {
        let response = self.upload_many(class_id, image_base64).await?;
        if !response.is_success() {
            tracing::debug!(%class_id, status = %response.status, "Recognition pass not successful");
        }
        Ok(response.into_detections())
    }

    /// Display name of an enrolled user (`GET /users/{id}`).
    pub async fn user_name(&self, user_id: &str) -> Result<Option<String>, PresenceApiError> {
        let doc: NameResponse = self.get_json(&["users", user_id]).await?;
        Ok(doc.into_name())
    }

    /// Display name of a visitor (`GET /users/visitor/{id}`).
    pub async fn visitor_name(&self, visitor_id: &str) -> Result<Option<String>, PresenceApiError> {
        let doc: NameResponse = self.get_json(&["users", "visitor", visitor_id]).await?;
        Ok(doc.into_name())
    }

    /// Display name of a class.
    ///
    /// Tries `GET /class/{id}` first. If that fails or carries no usable
    /// name, falls back to `GET /class` and matches the listing by id.
    /// Lookup failures are logged and yield `None`.
    pub async fn class_name(&self, class_id: &str) -> Option<String> {
        match self.get_json::<serde_json::Value>(&["class", class_id]).await {
            Ok(doc) => {
                if let Some(name) = extract_class_name(&doc) {
                    return Some(name);
                }
            }
            Err(e) => {
                tracing::debug!(class_id, error = %e, "Class lookup failed, scanning class list");
            }
        }

        match self.get_json::<serde_json::Value>(&["class"]).await {
            Ok(listing) => find_class_name(&listing, class_id),
            Err(e) => {
                tracing::warn!(class_id, error = %e, "Class list lookup failed");
                None
            }
        }
    }

    /// Resolve several class names concurrently.
    ///
    /// Duplicate and empty ids are looked up once or not at all; ids
    /// that cannot be resolved are left out of the map.
    pub async fn class_names<I, S>(&self, class_ids: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = class_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let lookups = unique.into_iter().map(|id| async move {
            let name = self.class_name(&id).await;
            (id, name)
        });

        futures::future::join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, name)| name.map(|name| (id, name)))
            .collect()
    }

    /// Attendance for one class over a manual date/time window.
    ///
    /// Sends `GET /attendance/attendance/report/by-manual` with the
    /// query's parameters.
    pub async fn attendance_report(
        &self,
        query: &ManualReportQuery,
    ) -> Result<AttendanceReport, PresenceApiError> {
        let pairs = query.query_pairs();
        let response = self
            .client
            .get(self.endpoint(&["attendance", "attendance", "report", "by-manual"])?)
            .query(&pairs[..])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PresenceApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PresenceApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, PresenceApiError> {
        let response = self.client.get(self.endpoint(segments)?).send().await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`PresenceApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PresenceApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PresenceApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PresenceApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_segments() {
        let api = PresenceApi::new("http://127.0.0.1:8000").unwrap();
        let url = api.endpoint(&["users", "visitor", "v1"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/users/visitor/v1");
    }

    #[test]
    fn endpoint_keeps_base_path_and_trailing_slash() {
        let api = PresenceApi::new("http://host/api/").unwrap();
        let url = api.endpoint(&["face", "uploadmany"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/face/uploadmany");
    }

    #[test]
    fn endpoint_escapes_ids() {
        let api = PresenceApi::new("http://host").unwrap();
        let url = api.endpoint(&["users", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://host/users/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            PresenceApi::new("not a url"),
            Err(PresenceApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            PresenceApi::new("mailto:ops@example.com"),
            Err(PresenceApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn api_error_display() {
        let err = PresenceApiError::ApiError {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Backend API error (502): bad gateway");
    }
}
