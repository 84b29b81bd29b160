//! Typed accessors over the query catalogue.

mod problems;
mod users;

pub use problems::ProblemsApi;
pub use users::UsersApi;
