/// The catalog controller
///
/// Single source of truth for the drawings on screen: the current page,
/// whether another page exists, the settled search term, and the records
/// themselves. Network calls happen elsewhere (as iced tasks); this type
/// decides what to request and which results to accept.
///
/// Fetches are tagged with a sequence number. Only the response to the most
/// recently issued request is applied, so a slow answer for page 1 can
/// never overwrite page 2 after the user clicked "next".

use tracing::{debug, error, info, warn};

use super::data::{Draw, DrawPage};
use super::toast::Toast;
use crate::api::ApiError;

/// Everything needed to issue one `GET /draws/{page}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub page: u32,
    pub search: String,
}

/// What happened to a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// List and flag replaced
    Applied,
    /// A newer request was issued meanwhile; result dropped
    Stale,
    /// Request failed; previous state kept
    Failed,
}

/// Follow-up work after a create/delete completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub toast: Toast,
    /// Reload the current page
    pub refetch: bool,
    pub succeeded: bool,
}

#[derive(Debug)]
pub struct Catalog {
    page: u32,
    has_next_page: bool,
    draws: Vec<Draw>,
    search: String,
    latest_seq: u64,
    fetching: bool,
    busy: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            page: 1,
            has_next_page: false,
            draws: Vec::new(),
            search: String::new(),
            latest_seq: 0,
            fetching: false,
            busy: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Settled search term the current list was requested with
    pub fn search(&self) -> &str {
        &self.search
    }

    #[cfg(test)]
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Waiting on the latest fetch
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// A create or delete is in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn find(&self, id: &str) -> Option<&Draw> {
        self.draws.iter().find(|draw| draw.id == id)
    }

    // ========== Pagination ==========

    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.has_next_page
    }

    /// Advance one page. Returns true if a fetch is needed.
    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back one page, never below 1. Returns true if a fetch is needed.
    pub fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Apply a newly settled search term. Returns true if it changed.
    pub fn set_search(&mut self, term: &str) -> bool {
        if self.search == term {
            return false;
        }
        self.search = term.to_string();
        true
    }

    // ========== Fetching ==========

    /// Issue a new request for the current page and search term.
    /// Any request issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.latest_seq += 1;
        self.fetching = true;

        FetchRequest {
            seq: self.latest_seq,
            page: self.page,
            search: self.search.clone(),
        }
    }

    /// Accept or discard the result of request `seq`
    pub fn apply_fetch(&mut self, seq: u64, result: Result<DrawPage, ApiError>) -> FetchOutcome {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "discarding stale fetch result");
            return FetchOutcome::Stale;
        }
        self.fetching = false;

        match result {
            Ok(page) => {
                debug!(
                    page = self.page,
                    count = page.docs.len(),
                    has_next = page.has_next_page,
                    "page loaded"
                );
                self.has_next_page = page.has_next_page;
                self.draws = page.docs;
                FetchOutcome::Applied
            }
            Err(err) => {
                // Background refreshes fail quietly: log only, no toast
                warn!(page = self.page, error = %err, "failed to fetch draws");
                FetchOutcome::Failed
            }
        }
    }

    // ========== Mutations ==========

    /// Mark a create/delete as started. Returns false if one is already running.
    pub fn begin_mutation(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    /// Finish a create. Success reloads the page instead of inserting locally.
    pub fn finish_create(&mut self, result: Result<String, ApiError>) -> MutationOutcome {
        self.busy = false;

        match result {
            Ok(message) => {
                info!("✅ Draw created: {}", message);
                MutationOutcome {
                    toast: Toast::success(message),
                    refetch: true,
                    succeeded: true,
                }
            }
            Err(err) => {
                error!(error = ?err, "failed to create draw");
                MutationOutcome {
                    toast: Toast::error(err.message()),
                    refetch: false,
                    succeeded: false,
                }
            }
        }
    }

    /// Finish a delete. Success removes the record with `id` locally, without reloading.
    pub fn finish_delete(&mut self, id: &str, result: Result<String, ApiError>) -> MutationOutcome {
        self.busy = false;

        match result {
            Ok(message) => {
                let before = self.draws.len();
                self.draws.retain(|draw| draw.id != id);
                if self.draws.len() == before {
                    debug!(id, "deleted draw was no longer on screen");
                }

                info!("🗑️ Draw {} deleted: {}", id, message);
                MutationOutcome {
                    toast: Toast::success(message),
                    refetch: false,
                    succeeded: true,
                }
            }
            Err(err) => {
                error!(id, error = ?err, "failed to delete draw");
                MutationOutcome {
                    toast: Toast::error(err.message()),
                    refetch: false,
                    succeeded: false,
                }
            }
        }
    }
}
