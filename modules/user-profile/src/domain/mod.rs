pub mod error;
pub mod fields;
pub mod form;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
