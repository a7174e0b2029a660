//! Domain Layer
//!
//! Core business objects and rules, free of transport concerns.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
