//! Capability traits the application workflow and handlers are written
//! against, and their SQLite-backed implementation on [`Database`].

use anyhow::{Context, anyhow};
use tukang_db::queries::RegisterOutcome;
use tracing::warn;

use tukang_db::Database;
use tukang_db::applications::{ApplyOutcome, Scope, ScopedOutcome};
use tukang_db::models::{NewStore, NewUser, StoreListRow, StoreRow, UserRow};
use tukang_types::models::{
    ApplicationStatus, Role, StoreApplication, StoreDetail, StorePage, StoreSummary, UserDetail,
    WorkerApplication,
};

use crate::error::AppError;
use crate::password;
use crate::validation::Registration;

pub trait UserDirectory: Send + Sync {
    fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;
    fn exists_by_phone(&self, phone_number: &str) -> Result<bool, AppError>;
    fn get_detail(&self, id: i64) -> Result<Option<UserDetail>, AppError>;
    /// Insert the user and, for store accounts, its store, atomically.
    /// A registered phone number is `PhoneTaken`.
    fn create_with_optional_store(&self, registration: &Registration) -> Result<i64, AppError>;
    fn verify_credentials(&self, phone_number: &str, password: &str) -> Result<UserDetail, AppError>;
}

pub trait StoreDirectory: Send + Sync {
    fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;
    fn get_detail(&self, id: i64) -> Result<Option<StoreDetail>, AppError>;
    fn get_by_owner(&self, user_id: i64) -> Result<Option<StoreDetail>, AppError>;
    fn set_hiring(&self, id: i64, is_hiring: bool) -> Result<(), AppError>;
    fn set_image_url(&self, id: i64, url_image: &str) -> Result<(), AppError>;
    fn mark_owner_verified(&self, id: i64) -> Result<(), AppError>;
    /// `mark_owner_verified` and `set_image_url` as one write.
    fn attach_image(&self, id: i64, url_image: &str) -> Result<(), AppError>;
    fn list(&self, page: u32, limit: u32, hiring: Option<bool>) -> Result<StorePage, AppError>;
}

/// Application writes that must be atomic with their preconditions.
pub trait ApplicationLedger: Send + Sync {
    fn insert(&self, worker_id: i64, store_id: i64, is_direct_hire: bool) -> Result<ApplyOutcome, AppError>;
    fn for_store(&self, store_id: i64) -> Result<Vec<StoreApplication>, AppError>;
    fn for_worker(&self, worker_id: i64, is_direct_hire: bool) -> Result<Vec<WorkerApplication>, AppError>;
    fn update_status(&self, id: i64, scope: Scope, status: ApplicationStatus) -> Result<ScopedOutcome, AppError>;
    fn delete(&self, id: i64, worker_id: i64) -> Result<ScopedOutcome, AppError>;
    /// Reject all non-rejected applications and clear the hiring flag.
    /// `None` when the store does not exist.
    fn close_hiring(&self, store_id: i64) -> Result<Option<usize>, AppError>;
}

// -- Row conversion --

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.parse()
        .map_err(|e| AppError::Persistence(anyhow!("corrupt application status: {}", e)))
}

fn user_detail(row: UserRow) -> Result<UserDetail, AppError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|e| AppError::Persistence(anyhow!("corrupt role on user {}: {}", row.id, e)))?;

    Ok(UserDetail {
        id: row.id,
        phone_number: row.phone_number,
        name: row.name,
        role,
        is_verified: row.is_verified,
        created_at: row.created_at,
    })
}

fn store_detail(row: StoreRow) -> StoreDetail {
    StoreDetail {
        id: row.id,
        user_id: row.user_id,
        store_name: row.store_name,
        address: row.address,
        url_image: row.url_image,
        latitude: row.latitude,
        longitude: row.longitude,
        working_hours: row.working_hours,
        is_hiring: row.is_hiring,
        is_paid: row.is_paid,
        is_verified: row.is_verified,
        created_at: row.created_at,
    }
}

fn store_summary(row: StoreListRow) -> StoreSummary {
    StoreSummary {
        id: row.id,
        user_id: row.user_id,
        store_name: row.store_name,
        address: row.address,
        url_image: row.url_image,
        working_hours: row.working_hours,
        is_hiring: row.is_hiring,
        is_paid: row.is_paid,
    }
}

// -- SQLite implementation --

impl UserDirectory for Database {
    fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.user_exists(id)?)
    }

    fn exists_by_phone(&self, phone_number: &str) -> Result<bool, AppError> {
        Ok(self.phone_exists(phone_number)?)
    }

    fn get_detail(&self, id: i64) -> Result<Option<UserDetail>, AppError> {
        self.get_user_by_id(id)?.map(user_detail).transpose()
    }

    fn create_with_optional_store(&self, registration: &Registration) -> Result<i64, AppError> {
        let password_hash = password::hash_password(&registration.password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

        let user = NewUser {
            phone_number: &registration.phone_number,
            name: &registration.name,
            password_hash: &password_hash,
            role: registration.role.as_str(),
            // Stores become verified on their first storefront upload
            is_verified: registration.role == Role::Tukang,
        };
        let store = registration.store.as_ref().map(|s| NewStore {
            store_name: &s.store_name,
            address: &s.address,
            latitude: s.latitude,
            longitude: s.longitude,
            working_hours: s.working_hours.as_deref().unwrap_or_default(),
        });

        match self
            .create_user_with_store(&user, store.as_ref())
            .context("create user")?
        {
            RegisterOutcome::Created(id) => Ok(id),
            RegisterOutcome::PhoneTaken => Err(AppError::PhoneTaken),
        }
    }

    fn verify_credentials(&self, phone_number: &str, password: &str) -> Result<UserDetail, AppError> {
        let row = self
            .get_user_by_phone(phone_number)?
            .ok_or(AppError::Unauthorized("invalid phone number or password"))?;

        let matches = password::verify_password(password, &row.password).map_err(|e| {
            warn!("Unreadable password hash for user {}: {}", row.id, e);
            AppError::Internal("stored password hash is unreadable".into())
        })?;
        if !matches {
            return Err(AppError::Unauthorized("invalid phone number or password"));
        }

        user_detail(row)
    }
}

impl StoreDirectory for Database {
    fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.store_exists(id)?)
    }

    fn get_detail(&self, id: i64) -> Result<Option<StoreDetail>, AppError> {
        Ok(self.get_store(id)?.map(store_detail))
    }

    fn get_by_owner(&self, user_id: i64) -> Result<Option<StoreDetail>, AppError> {
        Ok(self.get_store_by_owner(user_id)?.map(store_detail))
    }

    fn set_hiring(&self, id: i64, is_hiring: bool) -> Result<(), AppError> {
        if self.set_store_hiring(id, is_hiring)? {
            Ok(())
        } else {
            Err(AppError::NotFound("store"))
        }
    }

    fn set_image_url(&self, id: i64, url_image: &str) -> Result<(), AppError> {
        if self.set_store_image(id, url_image)? {
            Ok(())
        } else {
            Err(AppError::NotFound("store"))
        }
    }

    fn mark_owner_verified(&self, id: i64) -> Result<(), AppError> {
        if self.verify_store_owner(id)? {
            Ok(())
        } else {
            Err(AppError::NotFound("store"))
        }
    }

    fn attach_image(&self, id: i64, url_image: &str) -> Result<(), AppError> {
        if self.attach_store_image(id, url_image)? {
            Ok(())
        } else {
            Err(AppError::NotFound("store"))
        }
    }

    fn list(&self, page: u32, limit: u32, hiring: Option<bool>) -> Result<StorePage, AppError> {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let stores = self
            .list_stores(limit, offset, hiring)?
            .into_iter()
            .map(store_summary)
            .collect();

        Ok(StorePage { page, limit, stores })
    }
}

impl ApplicationLedger for Database {
    fn insert(&self, worker_id: i64, store_id: i64, is_direct_hire: bool) -> Result<ApplyOutcome, AppError> {
        Ok(self.apply(worker_id, store_id, is_direct_hire)?)
    }

    fn for_store(&self, store_id: i64) -> Result<Vec<StoreApplication>, AppError> {
        self.applications_for_store(store_id)?
            .into_iter()
            .map(|row| {
                Ok(StoreApplication {
                    id: row.id,
                    user_id: row.tukang_id,
                    user_name: row.user_name,
                    phone_number: row.phone_number,
                    status: parse_status(&row.status)?,
                    is_direct_hire: row.is_direct_hire,
                    applied_at: row.applied_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    fn for_worker(&self, worker_id: i64, is_direct_hire: bool) -> Result<Vec<WorkerApplication>, AppError> {
        self.applications_for_worker(worker_id, is_direct_hire)?
            .into_iter()
            .map(|row| {
                Ok(WorkerApplication {
                    id: row.id,
                    store_id: row.store_id,
                    store_name: row.store_name,
                    address: row.address,
                    url_image: row.url_image,
                    working_hours: row.working_hours,
                    is_hiring: row.is_hiring,
                    is_direct_hiring: row.is_direct_hire,
                    status: parse_status(&row.status)?,
                    applied_at: row.applied_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    fn update_status(&self, id: i64, scope: Scope, status: ApplicationStatus) -> Result<ScopedOutcome, AppError> {
        Ok(self.update_application_status(id, scope, status.as_str())?)
    }

    fn delete(&self, id: i64, worker_id: i64) -> Result<ScopedOutcome, AppError> {
        Ok(self.delete_application(id, worker_id)?)
    }

    fn close_hiring(&self, store_id: i64) -> Result<Option<usize>, AppError> {
        Ok(Database::close_hiring(self, store_id)?)
    }
}
