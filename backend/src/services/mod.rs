pub mod garden;
