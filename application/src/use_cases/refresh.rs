//! Ordered document list refresh.
//!
//! Background polling and the explicit refresh after an upload or delete
//! race each other, so `list()` responses can arrive in any order. Every
//! request takes a sequence number when issued; a response is applied only
//! if it is newer than the last one applied. Failures follow the same rule
//! and never clear the listing.

use compend_domain::DocumentListing;
use tracing::debug;

/// Sequence number of an issued `list()` request.
pub type RefreshSeq = u64;

/// What happened to a completed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshApply {
    /// Became the current listing (or current error).
    Applied,
    /// A newer request already settled; this result was dropped.
    Stale,
}

/// Tracks the current listing and which request produced it.
#[derive(Debug, Default)]
pub struct RefreshTracker {
    last_issued: RefreshSeq,
    last_applied: RefreshSeq,
    listing: DocumentListing,
    last_error: Option<String>,
    loaded: bool,
    stale_discarded: u64,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequence number. Call before sending the request.
    pub fn issue(&mut self) -> RefreshSeq {
        self.last_issued += 1;
        self.last_issued
    }

    /// Apply a successful response.
    pub fn apply_success(&mut self, seq: RefreshSeq, listing: DocumentListing) -> RefreshApply {
        if !self.claim(seq) {
            return RefreshApply::Stale;
        }
        self.listing = listing;
        self.last_error = None;
        self.loaded = true;
        RefreshApply::Applied
    }

    /// Apply a failed response. The previous listing stays in place.
    pub fn apply_failure(&mut self, seq: RefreshSeq, message: impl Into<String>) -> RefreshApply {
        if !self.claim(seq) {
            return RefreshApply::Stale;
        }
        self.last_error = Some(message.into());
        RefreshApply::Applied
    }

    fn claim(&mut self, seq: RefreshSeq) -> bool {
        if seq <= self.last_applied {
            self.stale_discarded += 1;
            debug!(
                seq,
                last_applied = self.last_applied,
                "Discarding stale document list response"
            );
            return false;
        }
        self.last_applied = seq;
        true
    }

    pub fn listing(&self) -> &DocumentListing {
        &self.listing
    }

    /// Message of the most recent failed refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// At least one refresh has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    pub fn last_applied(&self) -> RefreshSeq {
        self.last_applied
    }
}
