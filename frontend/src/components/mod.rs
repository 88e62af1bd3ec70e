pub mod auth;
pub mod catalog;
pub mod chat;
pub mod header;
pub mod listings;
pub mod profile;
pub mod sidebar;
