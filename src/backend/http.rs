//! The analysis service over HTTP.
//!
//! `POST {api}/api/v1/contract/analyze` with one multipart `file` part and
//! `Accept: application/json`. When the configured dev trigger appears in the
//! filename the same request goes to the site's simulation route instead.

use super::AnalysisBackend;
use crate::config::ClientConfig;
use crate::error::ContractReaderError;
use crate::upload::UploadFile;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ContractReaderError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("contract-reader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContractReaderError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Where `file` will be posted.
    pub fn analysis_url(&self, file: &UploadFile) -> String {
        if self.config.is_simulated(&file.name) {
            self.config.simulate_url()
        } else {
            self.config.analyze_url()
        }
    }

    fn network_error(url: &str, e: reqwest::Error) -> ContractReaderError {
        ContractReaderError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }

    fn timeout_secs(&self) -> u64 {
        self.config.request_timeout.as_secs().max(1)
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, file: &UploadFile) -> Result<Value, ContractReaderError> {
        let url = self.analysis_url(file);
        info!("Posting '{}' ({} bytes) to {}", file.name, file.bytes.len(), url);

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime())
            .map_err(|_| ContractReaderError::InvalidFileType {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::network_error(&url, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(&url, e))?;

        if !status.is_success() {
            debug!(
                "Error body from {}: {}",
                url,
                String::from_utf8_lossy(&body[..body.len().min(512)])
            );
            return Err(ContractReaderError::Server {
                url,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        debug!("Analysis response: {} bytes", body.len());
        serde_json::from_slice(&body).map_err(|e| ContractReaderError::Parse {
            detail: e.to_string(),
        })
    }

    async fn fetch_sample(&self) -> Result<Vec<u8>, ContractReaderError> {
        let url = self.config.sample_url();
        debug!("Fetching sample contract from {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| ContractReaderError::SampleFetchFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractReaderError::SampleUnavailable {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ContractReaderError::SampleFetchFailed {
                reason: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }

    async fn download_report(&self, url: &str) -> Result<Vec<u8>, ContractReaderError> {
        info!("Downloading report from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ContractReaderError::Timeout {
                        secs: self.timeout_secs(),
                    }
                } else {
                    Self::network_error(url, e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContractReaderError::ReportNotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ContractReaderError::Server {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_routes_to_simulation() {
        let config = ClientConfig::builder()
            .simulate_trigger("board")
            .build()
            .unwrap();
        let backend = HttpBackend::new(config).unwrap();
        let file = UploadFile::new("test_BOARD.pdf", None, vec![]);
        assert_eq!(
            backend.analysis_url(&file),
            "http://localhost:3000/api/simulate-board-ready"
        );
        let file = UploadFile::new("contrat.pdf", None, vec![]);
        assert_eq!(
            backend.analysis_url(&file),
            "http://localhost:8002/api/v1/contract/analyze"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let config = ClientConfig::builder()
            .api_base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let backend = HttpBackend::new(config).unwrap();
        let file = UploadFile::new("c.pdf", None, b"%PDF".to_vec());
        let err = backend.analyze(&file).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NetworkError);
    }
}
