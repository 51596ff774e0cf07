pub mod api;
pub mod app;
pub mod demo;
pub mod format;
pub mod net;
pub mod session;
pub mod ui;
pub mod validate;

pub mod pages {
    pub mod activities;
    pub mod dashboard;
    pub mod habits;
    pub mod login;
    pub mod profile;
    pub mod register;
    pub mod stats;
}

pub use api::{ApiClient, ApiConfig, ApiError, ApiResult};
pub use session::Session;
