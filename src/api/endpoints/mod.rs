//! Endpoint handlers, one module per engine surface.
//!
//! Handlers validate the body, take the connection lock, run the synchronous
//! engine call and return JSON. No lock is held across an `.await`.

pub mod conflicts;
pub mod health;
pub mod prescriptions;
pub mod safety;
pub mod suggestions;
