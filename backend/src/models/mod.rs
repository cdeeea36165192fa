pub mod entry;
pub mod garden;
pub mod todo;
pub mod user;
