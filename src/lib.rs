pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod shell;
pub mod sql;
pub mod store;
