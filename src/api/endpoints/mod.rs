//! API endpoint handlers, one module per screen family.

pub mod appointments;
pub mod calendar;
pub mod health;
pub mod session;
