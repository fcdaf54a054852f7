pub mod access;
pub mod filter;
pub mod reminder;
pub mod validate;
pub mod view;
