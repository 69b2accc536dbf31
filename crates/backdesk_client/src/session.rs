//! Async driver tying one list controller to the API client.
//!
//! The session owns the per-screen [`ListController`] plus the [`ApiClient`]
//! and is the only place requests are issued from. In-flight guards mirror
//! the UI-level locks the screens need: one bulk operation at a time, and no
//! double-submission against the same row.

use crate::api::ApiClient;
use backdesk_core::{ApiError, BulkOperationResult, FetchOutcome, ListController, Resource};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, warn};

/// Explicit yes/no gate for irreversible deletes. Constructing the token is
/// the caller's confirmation step; there is no unconfirmed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
}

/// One admin screen's connection to the API.
pub struct ListSession<R: Resource> {
    controller: ListController<R>,
    client: ApiClient,
    busy_ids: BTreeSet<String>,
    bulk_in_flight: bool,
    reauth_pending: bool,
}

impl<R: Resource> ListSession<R> {
    pub fn new(client: ApiClient, controller: ListController<R>) -> Self {
        Self {
            controller,
            client,
            busy_ids: BTreeSet::new(),
            bulk_in_flight: false,
            reauth_pending: false,
        }
    }

    pub fn controller(&self) -> &ListController<R> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ListController<R> {
        &mut self.controller
    }

    /// Perform the due fetch, if any, and commit its classified outcome.
    ///
    /// # Returns
    /// `true` when a fetch was issued (regardless of how it resolved).
    pub async fn pump(&mut self) -> bool {
        let Some(pending) = self.controller.poll_due_fetch(Instant::now()) else {
            return false;
        };
        let result = self
            .client
            .fetch_list::<R>(&pending.descriptor)
            .await
            .map(|payload| (payload.items, payload.page));
        let outcome = FetchOutcome::from_result(result);
        if matches!(outcome, FetchOutcome::AuthRequired) {
            self.note_auth_failure();
        }
        self.controller.commit(pending.seq, outcome);
        true
    }

    /// Wait out any pending debounce window, then pump until the controller
    /// has nothing left to fetch. Dropping the returned future cancels the
    /// wait with it; no timer outlives the session.
    pub async fn run_until_idle(&mut self) {
        loop {
            if self.pump().await {
                continue;
            }
            match self.controller.next_due_in(Instant::now()) {
                Some(remaining) => tokio::time::sleep(remaining).await,
                None => break,
            }
        }
    }

    /// Refetch the current query even though nothing changed.
    pub async fn refresh(&mut self) -> bool {
        self.controller.force_refresh();
        self.pump().await
    }

    /// Apply a status change to every selected row.
    ///
    /// Full success clears the selection and refetches the current page so
    /// counts and filter membership reflect the mutation. Partial failure
    /// leaves exactly the failed IDs selected and is reported to the caller;
    /// it is never collapsed into success.
    pub async fn apply_bulk_status(
        &mut self,
        status: &str,
    ) -> Result<BulkOperationResult, ApiError> {
        if self.bulk_in_flight {
            return Err(ApiError::Validation(
                "a bulk operation is already in flight".to_string(),
            ));
        }
        let ids = self.controller.begin_bulk()?;
        self.bulk_in_flight = true;
        self.busy_ids.extend(ids.iter().cloned());

        let result = self
            .client
            .bulk_update_status(R::BASE_PATH, &ids, status)
            .await;

        self.busy_ids.clear();
        self.bulk_in_flight = false;

        match result {
            Ok(report) => {
                self.controller.apply_bulk_result(&report);
                if report.is_full_success() {
                    self.refresh().await;
                } else {
                    warn!(
                        resource = R::BASE_PATH,
                        failed = report.failed_ids.len(),
                        requested = report.requested,
                        "bulk status update partially failed"
                    );
                }
                Ok(report)
            }
            Err(err) => {
                // Nothing was confirmed; rows keep their prior status and
                // the selection survives for a retry.
                if err.requires_reauth() {
                    self.note_auth_failure();
                }
                Err(err)
            }
        }
    }

    /// Delete one row after explicit confirmation.
    pub async fn delete(
        &mut self,
        id: &str,
        _confirmation: DeleteConfirmation,
    ) -> Result<(), ApiError> {
        self.lock_row(id)?;
        let result = self.client.delete_one(R::BASE_PATH, id).await;
        self.busy_ids.remove(id);
        match result {
            Ok(()) => {
                debug!(resource = R::BASE_PATH, id, "row deleted");
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                if err.requires_reauth() {
                    self.note_auth_failure();
                }
                Err(err)
            }
        }
    }

    /// Update one row's status.
    pub async fn set_status(
        &mut self,
        id: &str,
        status: &str,
        note: Option<&str>,
    ) -> Result<(), ApiError> {
        self.lock_row(id)?;
        let result = self.client.update_status(R::BASE_PATH, id, status, note).await;
        self.busy_ids.remove(id);
        match result {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                if err.requires_reauth() {
                    self.note_auth_failure();
                }
                Err(err)
            }
        }
    }

    /// Whether a row currently has a mutation in flight.
    pub fn is_row_busy(&self, id: &str) -> bool {
        self.busy_ids.contains(id)
    }

    /// One-shot reauthentication prompt: returns `true` exactly once after a
    /// 401 so the shell can redirect to login without looping.
    pub fn take_reauth_prompt(&mut self) -> bool {
        std::mem::take(&mut self.reauth_pending)
    }

    fn note_auth_failure(&mut self) {
        warn!(resource = R::BASE_PATH, "credential rejected; reauthentication required");
        self.reauth_pending = true;
    }

    fn lock_row(&mut self, id: &str) -> Result<(), ApiError> {
        if self.busy_ids.contains(id) {
            return Err(ApiError::Validation(format!(
                "a request for {} '{}' is already in flight",
                R::DISPLAY_NAME,
                id
            )));
        }
        self.busy_ids.insert(id.to_string());
        Ok(())
    }
}
