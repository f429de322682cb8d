use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{PocBackend, SearchQuery};
use crate::artifact::PocArtifact;
use crate::errors::PocForgeError;
use crate::models::PocRecord;
use super::query::{self, Category, LibraryFilter, LibraryStatistics, SortKey};

/// Server page size for one reload.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Cached records plus the active view settings. Serializable so a front end
/// can persist or inspect it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryState {
    pub records: Vec<PocRecord>,
    pub filter: LibraryFilter,
    pub sort: SortKey,
}

/// Client-side cache of the POC store. Filtering, sorting and statistics all
/// run locally over the last reload.
pub struct PocLibrary {
    backend: Arc<dyn PocBackend>,
    page_size: usize,
    state: LibraryState,
}

impl PocLibrary {
    pub fn new(backend: Arc<dyn PocBackend>) -> Self {
        Self {
            backend,
            page_size: DEFAULT_PAGE_SIZE,
            state: LibraryState::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Replace the cache with one unfiltered server page. On failure the
    /// previous records stay in place.
    pub async fn reload(&mut self) -> Result<usize, PocForgeError> {
        let query = SearchQuery::page(self.page_size);
        match self.backend.search_pocs(&query).await {
            Ok(records) => {
                info!(count = records.len(), backend = self.backend.base_url(), "Library reloaded");
                self.state.records = records;
                Ok(self.state.records.len())
            }
            Err(e) => {
                warn!(error = %e, kept = self.state.records.len(), "Library reload failed");
                Err(e)
            }
        }
    }

    /// Records passing the active filter, in the active sort order.
    pub fn view(&self) -> Vec<&PocRecord> {
        let mut visible = query::filter(&self.state.records, &self.state.filter);
        query::sort(&mut visible, self.state.sort);
        visible
    }

    pub fn statistics(&self) -> LibraryStatistics {
        query::statistics(&self.state.records)
    }

    pub fn vuln_types(&self) -> Vec<String> {
        query::vuln_types(&self.state.records)
    }

    pub fn records(&self) -> &[PocRecord] {
        &self.state.records
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn set_category(&mut self, category: Category) {
        self.state.filter.category = category;
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.state.filter.keyword = keyword.into();
    }

    pub fn set_vuln_type(&mut self, vuln_type: Option<String>) {
        self.state.filter.vuln_type = vuln_type.filter(|t| !t.trim().is_empty());
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.sort = sort;
    }

    pub fn get(&self, id: u64) -> Option<&PocRecord> {
        self.state.records.iter().find(|r| r.id == id)
    }

    /// Cached record, or a single fetch when it is not in the current page.
    pub async fn detail(&self, id: u64) -> Result<PocRecord, PocForgeError> {
        match self.get(id) {
            Some(record) => Ok(record.clone()),
            None => self.backend.get_poc(id).await,
        }
    }

    /// Delete on the server, then drop the record locally without a reload.
    pub async fn delete(&mut self, id: u64) -> Result<(), PocForgeError> {
        self.backend.delete_poc(id).await?;
        self.state.records.retain(|r| r.id != id);
        info!(poc_id = id, "POC deleted");
        Ok(())
    }

    pub async fn fetch_code(&self, id: u64) -> Result<String, PocForgeError> {
        self.backend.get_poc_code(id).await
    }

    pub async fn download(&self, id: u64) -> Result<PocArtifact, PocForgeError> {
        let record = self.detail(id).await?;
        let code = self.fetch_code(id).await?;
        PocArtifact::from_library(&record, &code)
    }
}
