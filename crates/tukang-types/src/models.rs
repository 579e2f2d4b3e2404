use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A stored string that does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// -- Roles --

/// Account role. A `Store` user owns exactly one store row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tukang,
    Store,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tukang => "tukang",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tukang" => Ok(Self::Tukang),
            "store" => Ok(Self::Store),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

// -- Applications --

/// Application lifecycle: `Sent` moves to one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Sent,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Status a principal may set on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl From<Decision> for ApplicationStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => Self::Accepted,
            Decision::Rejected => Self::Rejected,
        }
    }
}

// -- Directory views --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDetail {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: i64,
    pub user_id: i64,
    pub store_name: String,
    pub address: String,
    pub url_image: String,
    pub working_hours: String,
    pub is_hiring: bool,
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePage {
    pub page: u32,
    pub limit: u32,
    pub stores: Vec<StoreSummary>,
}

/// Store dashboard: the store row with its owner's account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDashboard {
    #[serde(flatten)]
    pub store: StoreDetail,
    pub user: UserDetail,
}

// -- Application views --

/// An application as seen by the store it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreApplication {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub phone_number: String,
    pub status: ApplicationStatus,
    pub is_direct_hire: bool,
    pub applied_at: i64,
    pub updated_at: i64,
}

/// An application as seen by the worker it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerApplication {
    pub id: i64,
    pub store_id: i64,
    pub store_name: String,
    pub address: String,
    pub url_image: String,
    pub working_hours: String,
    pub is_hiring: bool,
    pub is_direct_hiring: bool,
    pub status: ApplicationStatus,
    pub applied_at: i64,
    pub updated_at: i64,
}
