pub mod applications;
pub mod auth;
pub mod directory;
pub mod error;
pub mod health;
pub mod images;
pub mod middleware;
pub mod password;
pub mod router;
pub mod stores;
pub mod token;
pub mod validation;
pub mod workflow;

pub use auth::{AppState, AppStateInner};
pub use router::router;
