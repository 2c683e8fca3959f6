//! Application services

pub mod binder;

pub use binder::ConfigBinder;
