pub mod application;
pub mod document;
