//! The hiring-application workflow.
//!
//! Every operation validates references through the directories and then
//! commits its state change through the ledger, which runs the
//! invariant-bearing part in a single transaction.

use std::sync::Arc;

use tracing::info;

use tukang_db::Database;
use tukang_db::applications::{ApplyOutcome, Scope, ScopedOutcome};
use tukang_types::models::{
    ApplicationStatus, Decision, Role, StoreApplication, StoreDetail, WorkerApplication,
};

use crate::directory::{ApplicationLedger, StoreDirectory, UserDirectory};
use crate::error::AppError;
use crate::middleware::AuthenticatedActor;

/// The workflow as wired in the server: all three capabilities backed by
/// one SQLite database.
pub type Workflow = ApplicationWorkflow<Database, Database, Database>;

pub struct ApplicationWorkflow<U, S, L> {
    users: Arc<U>,
    stores: Arc<S>,
    ledger: Arc<L>,
}

impl<U, S, L> Clone for ApplicationWorkflow<U, S, L> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            stores: Arc::clone(&self.stores),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<U, S, L> ApplicationWorkflow<U, S, L>
where
    U: UserDirectory,
    S: StoreDirectory,
    L: ApplicationLedger,
{
    pub fn new(users: Arc<U>, stores: Arc<S>, ledger: Arc<L>) -> Self {
        Self { users, stores, ledger }
    }

    /// Create a `sent` application from `worker_id` to `store_id`.
    pub fn create_apply(&self, worker_id: i64, store_id: i64, is_direct_hire: bool) -> Result<i64, AppError> {
        if !self.stores.exists_by_id(store_id)? {
            return Err(AppError::InvalidReference("store"));
        }
        if !self.users.exists_by_id(worker_id)? {
            return Err(AppError::InvalidReference("user"));
        }

        match self.ledger.insert(worker_id, store_id, is_direct_hire)? {
            ApplyOutcome::Created(id) => {
                info!(
                    "Application {} created: worker {} -> store {} (direct hire: {})",
                    id, worker_id, store_id, is_direct_hire
                );
                Ok(id)
            }
            ApplyOutcome::Duplicate => Err(AppError::DuplicateApplication),
            // Deleted between the reference check and the insert
            ApplyOutcome::StoreMissing => Err(AppError::InvalidReference("store")),
            ApplyOutcome::NotHiring => Err(AppError::StoreNotHiring),
        }
    }

    pub fn apply_to_store(&self, actor: AuthenticatedActor, store_id: i64) -> Result<i64, AppError> {
        actor.require(Role::Tukang)?;
        self.create_apply(actor.id, store_id, false)
    }

    /// A store owner invites a worker to its own store.
    pub fn invite_worker(&self, actor: AuthenticatedActor, worker_id: i64) -> Result<i64, AppError> {
        let store = self.own_store(actor)?;

        match self.users.get_detail(worker_id)? {
            Some(user) if user.role == Role::Tukang => {}
            _ => return Err(AppError::InvalidReference("user")),
        }

        self.create_apply(worker_id, store.id, true)
    }

    pub fn review_applications(&self, store_id: i64) -> Result<Vec<StoreApplication>, AppError> {
        self.ledger.for_store(store_id)
    }

    pub fn review_for_store_owner(&self, actor: AuthenticatedActor) -> Result<Vec<StoreApplication>, AppError> {
        let store = self.own_store(actor)?;
        self.review_applications(store.id)
    }

    pub fn review_applications_for_worker(
        &self,
        worker_id: i64,
        is_direct_hire: bool,
    ) -> Result<Vec<WorkerApplication>, AppError> {
        self.ledger.for_worker(worker_id, is_direct_hire)
    }

    pub fn review_for_worker(
        &self,
        actor: AuthenticatedActor,
        is_direct_hire: bool,
    ) -> Result<Vec<WorkerApplication>, AppError> {
        actor.require(Role::Tukang)?;
        self.review_applications_for_worker(actor.id, is_direct_hire)
    }

    /// Move a `sent` application to a terminal status. Workers act on
    /// applications they made, store owners on applications to their store.
    pub fn set_application_status(
        &self,
        actor: AuthenticatedActor,
        app_id: i64,
        decision: Decision,
    ) -> Result<(), AppError> {
        let scope = match actor.role {
            Role::Tukang => Scope::Worker(actor.id),
            Role::Store => Scope::Store(self.own_store(actor)?.id),
        };
        let status = ApplicationStatus::from(decision);

        match self.ledger.update_status(app_id, scope, status)? {
            ScopedOutcome::Done => {
                info!("Application {} set to {} by {} {}", app_id, status, actor.role, actor.id);
                Ok(())
            }
            ScopedOutcome::Missing => Err(AppError::NotFound("application")),
            ScopedOutcome::NotOwned => Err(AppError::Forbidden("application belongs to another account")),
            ScopedOutcome::NotPending(current) => {
                let current = current.parse().map_err(|e| {
                    AppError::Persistence(anyhow::anyhow!("application {}: {}", app_id, e))
                })?;
                Err(AppError::InvalidTransition(current))
            }
        }
    }

    /// A worker deletes one of their own applications.
    pub fn withdraw_application(&self, actor: AuthenticatedActor, app_id: i64) -> Result<(), AppError> {
        actor.require(Role::Tukang)?;

        match self.ledger.delete(app_id, actor.id)? {
            ScopedOutcome::Done => {
                info!("Application {} withdrawn by worker {}", app_id, actor.id);
                Ok(())
            }
            ScopedOutcome::Missing => Err(AppError::NotFound("application")),
            ScopedOutcome::NotOwned => Err(AppError::Forbidden("application belongs to another account")),
            ScopedOutcome::NotPending(status) => Err(AppError::Internal(format!(
                "withdraw of application {app_id} reported status {status}"
            ))),
        }
    }

    /// Open or close hiring. Closing rejects every application to the
    /// store that is not already rejected; returns how many were.
    pub fn set_store_hiring(&self, store_id: i64, is_hiring: bool) -> Result<usize, AppError> {
        if is_hiring {
            self.stores.set_hiring(store_id, true)?;
            info!("Store {} opened hiring", store_id);
            return Ok(0);
        }

        let rejected = self
            .ledger
            .close_hiring(store_id)?
            .ok_or(AppError::NotFound("store"))?;
        info!("Store {} closed hiring, {} applications rejected", store_id, rejected);
        Ok(rejected)
    }

    pub fn set_own_store_hiring(&self, actor: AuthenticatedActor, is_hiring: bool) -> Result<usize, AppError> {
        let store = self.own_store(actor)?;
        self.set_store_hiring(store.id, is_hiring)
    }

    /// The store owned by a store-role caller.
    pub fn own_store(&self, actor: AuthenticatedActor) -> Result<StoreDetail, AppError> {
        actor.require(Role::Store)?;
        self.stores
            .get_by_owner(actor.id)?
            .ok_or(AppError::Forbidden("no store is registered to this account"))
    }
}
