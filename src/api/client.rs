use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::PocForgeError;
use crate::models::{ExecutionReport, GenerationRequest, PocRecord};
use super::backend::{ByteStream, PocBackend};
use super::models::*;

/// `PocBackend` over HTTP. Every endpoint lives under `<base>/api/`.
///
/// No client-side timeout or retry is configured; transport defaults apply.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Response, PocForgeError> {
        let resp = request
            .send()
            .await
            .map_err(|e| PocForgeError::transport(None, format!("{} request failed: {}", what, e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body: ErrorBody = resp.json().await.unwrap_or_default();
        let message = match body.message() {
            Some(detail) => format!("HTTP {}: {}", status.as_u16(), detail),
            None => format!("HTTP {}", status),
        };
        Err(PocForgeError::transport(Some(status.as_u16()), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, PocForgeError> {
        let resp = self.send(self.client.get(self.endpoint(path)), what).await?;
        decode(resp, what).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, PocForgeError> {
    resp.json::<T>()
        .await
        .map_err(|e| PocForgeError::transport(None, format!("Invalid {} response: {}", what, e)))
}

#[async_trait]
impl PocBackend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream, PocForgeError> {
        let resp = self
            .client
            .post(self.endpoint("generate-poc"))
            .json(request)
            .send()
            .await
            .map_err(|e| PocForgeError::transport(None, format!("Generate request failed: {}", e)))?;

        // The body of a failed generate response is never read.
        let status = resp.status();
        if !status.is_success() {
            return Err(PocForgeError::transport(Some(status.as_u16()), format!("HTTP {}", status)));
        }
        debug!(status = status.as_u16(), "Generation stream opened");

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(PocForgeError::from));
        Ok(Box::pin(body))
    }

    async fn search_pocs(&self, query: &SearchQuery) -> Result<Vec<PocRecord>, PocForgeError> {
        let resp = self
            .send(self.client.get(self.endpoint("pocs/search")).query(query), "search")
            .await?;
        let data: SearchResponse = decode(resp, "search").await?;
        if !data.success {
            return Err(PocForgeError::Application(
                data.error.unwrap_or_else(|| "POC search failed".to_string()),
            ));
        }
        debug!(count = data.pocs.len(), limit = query.limit, "Fetched POC page");
        Ok(data.pocs)
    }

    async fn get_poc(&self, id: u64) -> Result<PocRecord, PocForgeError> {
        let data: PocResponse = self.get_json(&format!("pocs/{}", id), "POC detail").await?;
        match data.poc {
            Some(poc) if data.success => Ok(poc),
            _ => Err(PocForgeError::NotFound(format!("POC {}", id))),
        }
    }

    async fn get_poc_code(&self, id: u64) -> Result<String, PocForgeError> {
        let data: CodeResponse = self.get_json(&format!("pocs/{}/code", id), "POC code").await?;
        Ok(data.code.unwrap_or_default())
    }

    async fn execute_poc(&self, id: u64, target_url: &str) -> Result<ExecutionReport, PocForgeError> {
        let request = self
            .client
            .post(self.endpoint(&format!("pocs/{}/execute", id)))
            .json(&json!({ "target_url": target_url }));
        let resp = self.send(request, "execute").await?;
        decode(resp, "execute").await
    }

    async fn delete_poc(&self, id: u64) -> Result<(), PocForgeError> {
        let resp = self
            .send(self.client.delete(self.endpoint(&format!("pocs/{}", id))), "delete")
            .await?;
        let data: DeleteResponse = decode(resp, "delete").await?;
        if data.success {
            Ok(())
        } else {
            Err(PocForgeError::Application(
                data.error.unwrap_or_else(|| "delete failed".to_string()),
            ))
        }
    }

    async fn statistics(&self) -> Result<ServerStatistics, PocForgeError> {
        let data: StatisticsResponse = self.get_json("pocs/statistics", "statistics").await?;
        Ok(data.statistics)
    }

    async fn vuln_types(&self) -> Result<Vec<VulnTypeCount>, PocForgeError> {
        let data: VulnTypesResponse = self.get_json("pocs/vuln-types", "vuln types").await?;
        Ok(data.vuln_types)
    }

    async fn health(&self) -> Result<Value, PocForgeError> {
        self.get_json("health", "health").await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
