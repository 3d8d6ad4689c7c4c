pub mod schema;
pub mod domain;

pub use domain::DomainError;
