use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use crate::errors::PocForgeError;
use crate::models::{ExecutionReport, GenerationRequest, PocRecord};
use super::models::{SearchQuery, ServerStatistics, VulnTypeCount};

/// Incremental response body of the generation endpoint.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, PocForgeError>> + Send>>;

/// The generation service and POC store, as seen from the client.
#[async_trait]
pub trait PocBackend: Send + Sync {
    /// Open a generation request. A non-success status fails here, before
    /// any body is read.
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream, PocForgeError>;

    async fn search_pocs(&self, query: &SearchQuery) -> Result<Vec<PocRecord>, PocForgeError>;

    async fn get_poc(&self, id: u64) -> Result<PocRecord, PocForgeError>;

    async fn get_poc_code(&self, id: u64) -> Result<String, PocForgeError>;

    async fn execute_poc(&self, id: u64, target_url: &str) -> Result<ExecutionReport, PocForgeError>;

    async fn delete_poc(&self, id: u64) -> Result<(), PocForgeError>;

    async fn statistics(&self) -> Result<ServerStatistics, PocForgeError>;

    async fn vuln_types(&self) -> Result<Vec<VulnTypeCount>, PocForgeError>;

    async fn health(&self) -> Result<Value, PocForgeError>;

    /// Base URL, for log fields.
    fn base_url(&self) -> &str;
}
