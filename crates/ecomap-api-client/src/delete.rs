//! Image deletion.
//!
//! Deleting needs the host's API secret, so it goes through a server-side
//! collaborator endpoint instead of the image host directly.

use crate::UploadClient;
use ecomap_core::{UploadError, UploaderConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    public_id: &'a str,
    cloud_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAcknowledgement {
    pub success: bool,
    /// Whatever the collaborator returned
    pub data: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct DeleteClient {
    client: Client,
    endpoint: String,
    cloud_name: String,
}

impl DeleteClient {
    pub fn new(client: Client, config: &UploaderConfig) -> Self {
        Self {
            client,
            endpoint: config.delete_endpoint.clone(),
            cloud_name: config.cloud_name.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn delete_image(&self, public_id: &str) -> Result<DeleteAcknowledgement, UploadError> {
        if public_id.trim().is_empty() {
            return Err(UploadError::Validation(vec![
                "public id must not be empty".to_string(),
            ]));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&DeleteRequest {
                public_id,
                cloud_name: &self.cloud_name,
            })
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(public_id, status = status.as_u16(), "Image delete rejected");
            return Err(UploadError::transport(format!(
                "delete returned {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;
        let data: serde_json::Value = serde_json::from_str(&body)?;

        tracing::info!(public_id, "Image deleted");
        Ok(DeleteAcknowledgement {
            success: true,
            data,
        })
    }
}

impl UploadClient {
    /// Delete client sharing this client's connection pool and config.
    pub fn delete_client(&self) -> DeleteClient {
        DeleteClient::new(self.client.clone(), &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::config_for;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_posts_public_id_and_cloud() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/delete-image")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "publicId": "sustainable-campus/1712_abc123",
                "cloudName": "demo"
            })))
            .with_status(200)
            .with_body(r#"{"result":"ok"}"#)
            .create_async()
            .await;

        let client = UploadClient::new(config_for(&server.url())).unwrap();
        let ack = client
            .delete_client()
            .delete_image("sustainable-campus/1712_abc123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(ack.success);
        assert_eq!(ack.data, json!({"result": "ok"}));
    }

    #[tokio::test]
    async fn test_delete_non_2xx_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/delete-image")
            .with_status(404)
            .create_async()
            .await;

        let client = UploadClient::new(config_for(&server.url())).unwrap();
        let err = client
            .delete_client()
            .delete_image("missing")
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::Transport("delete returned Not Found".to_string()));
    }

    #[tokio::test]
    async fn test_delete_rejects_blank_id() {
        let client = UploadClient::new(config_for("http://127.0.0.1:1")).unwrap();
        assert!(matches!(
            client.delete_client().delete_image("  ").await,
            Err(UploadError::Validation(_))
        ));
    }
}
