//! Database module for PostgreSQL connection and SQL generation

pub mod connection;
pub mod sql;

pub use connection::init_pool;
