//! Database row types. These map directly to SQLite rows and stay
//! independent of the tukang-types API models.

pub struct UserRow {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: i64,
}

/// Store row joined with its owner's verification flag.
pub struct StoreRow {
    pub id: i64,
    pub user_id: i64,
    pub store_name: String,
    pub address: String,
    pub url_image: String,
    pub latitude: f64,
    pub longitude: f64,
    pub working_hours: String,
    pub is_hiring: bool,
    pub is_paid: bool,
    pub is_verified: bool,
    pub created_at: i64,
}

pub struct StoreListRow {
    pub id: i64,
    pub user_id: i64,
    pub store_name: String,
    pub address: String,
    pub url_image: String,
    pub working_hours: String,
    pub is_hiring: bool,
    pub is_paid: bool,
}

pub struct ApplicationRow {
    pub id: i64,
    pub tukang_id: i64,
    pub store_id: i64,
    pub status: String,
    pub is_direct_hire: bool,
    pub applied_at: i64,
    pub updated_at: i64,
}

/// Application joined with the applicant's account.
pub struct StoreApplicationRow {
    pub id: i64,
    pub tukang_id: i64,
    pub user_name: String,
    pub phone_number: String,
    pub status: String,
    pub is_direct_hire: bool,
    pub applied_at: i64,
    pub updated_at: i64,
}

/// Application joined with the target store.
pub struct WorkerApplicationRow {
    pub id: i64,
    pub store_id: i64,
    pub store_name: String,
    pub address: String,
    pub url_image: String,
    pub working_hours: String,
    pub is_hiring: bool,
    pub is_direct_hire: bool,
    pub status: String,
    pub applied_at: i64,
    pub updated_at: i64,
}

pub struct NewUser<'a> {
    pub phone_number: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub is_verified: bool,
}

pub struct NewStore<'a> {
    pub store_name: &'a str,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub working_hours: &'a str,
}
