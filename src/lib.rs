pub mod adoptions;
pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod mocks;
pub mod pets;
pub mod response;
pub mod sessions;
pub mod state;
pub mod users;
pub mod validation;
