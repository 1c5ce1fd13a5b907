use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::core::config;
use crate::core::workload::Workload;

/// `WorkloadClient` is the single point of contact with the cluster
/// controller for workloads.
#[async_trait]
pub trait WorkloadClient {
    /// Creates the workload on the cluster and returns its identifier.
    async fn create_workload(&self, workload: &Workload) -> Result<String>;
}

/// `Client` provides the ability to interact
/// with the cluster controller by using HTTP Protocol.
#[derive(Debug)]
pub struct Client {
    /// The full address for accessing the cluster controller.
    ///
    /// e.g: http://127.0.0.1:5000
    endpoint: String,

    /// The internal HTTP client used to make requests.
    http_client: HttpClient,
}

impl Client {
    pub fn init(config: config::Cluster) -> Self {
        Self {
            endpoint: config.server,
            http_client: HttpClient::new(),
        }
    }

    /// Build a complete endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }
}

#[async_trait]
impl WorkloadClient for Client {
    async fn create_workload(&self, workload: &Workload) -> Result<String> {
        let endpoint = self.endpoint("api/v0/workloads.create");

        let response = self
            .http_client
            .post(endpoint)
            .body(serde_json::to_string(workload)?)
            .send()
            .await?
            .error_for_status()?;

        let json: Value = serde_json::from_str(&response.text().await?)?;
        Ok(json["id"].as_str().unwrap_or_default().to_string())
    }
}
