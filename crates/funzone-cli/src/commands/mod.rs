//! Command implementations.

pub(crate) mod config;
pub(crate) mod doctor;
pub(crate) mod list;
pub(crate) mod load;
