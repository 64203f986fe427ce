//! Business services for the phonebook API.
//!
//! Services own the invariants; repositories own the SQL. Route handlers
//! construct a service per request from the shared pool (cheap: the service
//! borrows the pool, nothing is connected until a query runs).

pub mod auth;
pub mod contacts;
pub mod token;
