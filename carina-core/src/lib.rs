//! Carina Core
//!
//! Configuration values and attribute schemas shared by Carina providers

pub mod resource;
pub mod schema;
