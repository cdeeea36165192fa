pub mod auth;
pub mod entries;
pub mod garden;
pub mod health;
pub mod todos;
