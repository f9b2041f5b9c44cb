//! Data-source collaborator boundary.
//!
//! Live mode pulls schedule data from account-bound services through this
//! trait. Implementations (OAuth flows, per-service response translation)
//! live outside the pipeline core; the engine only needs the call shape
//! and the two failure cases, which stages treat identically: degrade the
//! result, never retry. Retries belong to the reasoning failover chain;
//! these are single-shot account calls, not load-balanced pools.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{ContactRecord, EmailSummary, Meeting, RouteInfo, TaskItem};

#[async_trait]
pub trait DataSourceAdapter: Send + Sync {
    async fn fetch_meetings(&self) -> Result<Vec<Meeting>, SourceError>;

    async fn fetch_tasks(&self) -> Result<Vec<TaskItem>, SourceError>;

    async fn fetch_inbox_summary(&self) -> Result<Vec<EmailSummary>, SourceError>;

    async fn fetch_contacts(&self) -> Result<Vec<ContactRecord>, SourceError>;

    async fn fetch_directions(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RouteInfo, SourceError>;
}

/// Default adapter for a run with no linked account. Every call fails with
/// `NotAuthenticated`, so each Live fetch stage degrades to an explicit
/// "not connected" result instead of guessing data.
pub struct UnlinkedSource;

#[async_trait]
impl DataSourceAdapter for UnlinkedSource {
    async fn fetch_meetings(&self) -> Result<Vec<Meeting>, SourceError> {
        Err(SourceError::NotAuthenticated {
            service: "Calendar",
        })
    }

    async fn fetch_tasks(&self) -> Result<Vec<TaskItem>, SourceError> {
        Err(SourceError::NotAuthenticated { service: "Tasks" })
    }

    async fn fetch_inbox_summary(&self) -> Result<Vec<EmailSummary>, SourceError> {
        Err(SourceError::NotAuthenticated { service: "Email" })
    }

    async fn fetch_contacts(&self) -> Result<Vec<ContactRecord>, SourceError> {
        Err(SourceError::NotAuthenticated {
            service: "Contacts",
        })
    }

    async fn fetch_directions(&self, _: &str, _: &str) -> Result<RouteInfo, SourceError> {
        Err(SourceError::NotAuthenticated { service: "Maps" })
    }
}

// ============================================================================
// Test support
// ============================================================================
