pub mod components;
pub mod notify;
