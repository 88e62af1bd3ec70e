//! Client core for the FindMeRoom rental marketplace: session, city choice,
//! listing search and management, and the messaging views, all independent of
//! the UI toolkit that renders them.

pub mod api;
pub mod catalog;
pub mod chat;
pub mod city;
pub mod config;
pub mod errors;
pub mod guard;
pub mod listings;
pub mod models;
pub mod poll;
pub mod router;
pub mod session;
pub mod state;
pub mod storage;

pub use api::RentalApi;
pub use config::ClientConfig;
pub use errors::{AppError, Result};
pub use state::{SharedState, StateHandle};
