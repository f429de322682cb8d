//! In-memory `PocBackend` that counts calls, for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use crate::errors::PocForgeError;
use crate::models::{ExecutionReport, ExecutionVerdict, GenerationRequest, PocRecord};
use super::backend::{ByteStream, PocBackend};
use super::models::{SearchQuery, ServerStatistics, VulnTypeCount};

#[derive(Default)]
pub struct RecordingBackend {
    calls: AtomicUsize,
    feed: Vec<Vec<u8>>,
    keep_open: bool,
    generate_status: Option<u16>,
    pub records: Vec<PocRecord>,
    pub deleted: Mutex<Vec<u64>>,
    pub last_search: Mutex<Option<SearchQuery>>,
}

impl RecordingBackend {
    pub fn with_feed(feed: Vec<Vec<u8>>) -> Self {
        Self {
            feed,
            ..Default::default()
        }
    }

    /// Feed that never closes after its last chunk.
    pub fn with_open_feed(feed: Vec<Vec<u8>>) -> Self {
        Self {
            feed,
            keep_open: true,
            ..Default::default()
        }
    }

    pub fn failing_generate(status: u16) -> Self {
        Self {
            generate_status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_records(records: Vec<PocRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn find(&self, id: u64) -> Result<&PocRecord, PocForgeError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| PocForgeError::transport(Some(404), "HTTP 404: POC不存在"))
    }
}

#[async_trait]
impl PocBackend for RecordingBackend {
    async fn generate(&self, _request: &GenerationRequest) -> Result<ByteStream, PocForgeError> {
        self.record_call();
        if let Some(status) = self.generate_status {
            return Err(PocForgeError::transport(Some(status), format!("HTTP {}", status)));
        }
        let chunks: Vec<Result<Vec<u8>, PocForgeError>> = self.feed.iter().cloned().map(Ok).collect();
        let body = futures::stream::iter(chunks);
        if self.keep_open {
            Ok(Box::pin(body.chain(futures::stream::pending())))
        } else {
            Ok(Box::pin(body))
        }
    }

    async fn search_pocs(&self, query: &SearchQuery) -> Result<Vec<PocRecord>, PocForgeError> {
        self.record_call();
        *self.last_search.lock().unwrap() = Some(query.clone());
        Ok(self.records.iter().take(query.limit).cloned().collect())
    }

    async fn get_poc(&self, id: u64) -> Result<PocRecord, PocForgeError> {
        self.record_call();
        self.find(id).cloned()
    }

    async fn get_poc_code(&self, id: u64) -> Result<String, PocForgeError> {
        self.record_call();
        self.find(id).map(|_| format!("def scan(url):\n    return {{'poc': {}}}\n", id))
    }

    async fn execute_poc(&self, id: u64, target_url: &str) -> Result<ExecutionReport, PocForgeError> {
        self.record_call();
        self.find(id)?;
        Ok(ExecutionReport {
            success: true,
            poc_id: Some(id),
            target_url: target_url.to_string(),
            result: Some(ExecutionVerdict {
                vulnerable: false,
                reason: "no error signature".to_string(),
                details: None,
            }),
            error: None,
        })
    }

    async fn delete_poc(&self, id: u64) -> Result<(), PocForgeError> {
        self.record_call();
        self.find(id)?;
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn statistics(&self) -> Result<ServerStatistics, PocForgeError> {
        self.record_call();
        Ok(ServerStatistics {
            total_pocs: self.records.len() as u64,
            ..Default::default()
        })
    }

    async fn vuln_types(&self) -> Result<Vec<VulnTypeCount>, PocForgeError> {
        self.record_call();
        Ok(Vec::new())
    }

    async fn health(&self) -> Result<Value, PocForgeError> {
        self.record_call();
        Ok(json!({"status": "healthy"}))
    }

    fn base_url(&self) -> &str {
        "memory://"
    }
}
