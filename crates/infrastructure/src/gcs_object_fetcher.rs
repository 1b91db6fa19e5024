use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ppecheck_application::{FetchedObject, ObjectFetcher};
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::ObjectLocation;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::AccessTokenProvider;

/// Public Cloud Storage JSON API endpoint.
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

/// Cloud Storage implementation of the object fetcher port.
pub struct GcsObjectFetcher {
    http_client: reqwest::Client,
    base_url: Url,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl GcsObjectFetcher {
    /// Creates a fetcher against the given storage API base URL.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            token_provider,
        }
    }

    fn media_url(&self, location: &ObjectLocation) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "storage base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "storage",
                "v1",
                "b",
                location.container(),
                "o",
                location.object_key(),
            ]);
        url.query_pairs_mut().append_pair("alt", "media");

        Ok(url)
    }
}

#[async_trait]
impl ObjectFetcher for GcsObjectFetcher {
    async fn fetch(
        &self,
        location: &ObjectLocation,
        destination: &Path,
    ) -> AppResult<FetchedObject> {
        let url = self.media_url(location)?;
        let token = self.token_provider.access_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to call storage download endpoint for {location}: {error}"
                ))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("object {location} does not exist")));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "storage download for {location} returned status {}: {body}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(|error| {
            AppError::Unavailable(format!(
                "failed to read storage download body for {location}: {error}"
            ))
        })?;

        tokio::fs::write(destination, &bytes).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to write {location} to '{}': {error}",
                destination.display()
            ))
        })?;

        debug!(
            size_bytes = bytes.len(),
            destination = %destination.display(),
            "object downloaded to scratch space"
        );

        Ok(FetchedObject {
            path: destination.to_path_buf(),
            content_type,
            size_bytes: bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ppecheck_application::ObjectFetcher;
    use ppecheck_core::AppError;
    use ppecheck_domain::ObjectLocation;
    use url::Url;

    use super::GcsObjectFetcher;
    use crate::StaticAccessTokenProvider;

    fn fetcher(base_url: &str) -> GcsObjectFetcher {
        let base_url = match Url::parse(base_url) {
            Ok(url) => url,
            Err(error) => panic!("invalid mock server url: {error}"),
        };

        GcsObjectFetcher::new(
            reqwest::Client::new(),
            base_url,
            Arc::new(StaticAccessTokenProvider::new("test-token")),
        )
    }

    fn location() -> ObjectLocation {
        match ObjectLocation::new("camera-bucket", "uploads/captured_photo.jpg") {
            Ok(location) => location,
            Err(error) => panic!("invalid test location: {error}"),
        }
    }

    #[tokio::test]
    async fn fetch_downloads_object_media_into_destination() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/storage/v1/b/camera-bucket/o/uploads%2Fcaptured_photo.jpg",
            )
            .match_query(mockito::Matcher::UrlEncoded("alt".into(), "media".into()))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(b"\xff\xd8\xff\xe0jpeg-bytes")
            .create_async()
            .await;
        let Ok(scratch) = tempfile::tempdir() else {
            panic!("scratch dir should be creatable");
        };
        let destination = scratch.path().join("captured_photo.jpg");

        let fetched = fetcher(&server.url()).fetch(&location(), &destination).await;

        mock.assert_async().await;
        let Ok(fetched) = fetched else {
            panic!("fetch should succeed");
        };
        assert_eq!(fetched.path, destination);
        assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(fetched.size_bytes, 14);
        assert_eq!(
            std::fs::read(&destination).ok(),
            Some(b"\xff\xd8\xff\xe0jpeg-bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn missing_object_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/storage/v1/b/camera-bucket/o/uploads%2Fcaptured_photo.jpg",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"No such object"}}"#)
            .create_async()
            .await;
        let Ok(scratch) = tempfile::tempdir() else {
            panic!("scratch dir should be creatable");
        };
        let destination = scratch.path().join("captured_photo.jpg");

        let result = fetcher(&server.url()).fetch(&location(), &destination).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/storage/v1/b/camera-bucket/o/uploads%2Fcaptured_photo.jpg",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("backend unavailable")
            .create_async()
            .await;
        let Ok(scratch) = tempfile::tempdir() else {
            panic!("scratch dir should be creatable");
        };

        let result = fetcher(&server.url())
            .fetch(&location(), &scratch.path().join("captured_photo.jpg"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Unavailable(message)) if message.contains("503")
        ));
    }
}
