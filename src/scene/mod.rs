//! Boundary model: export configuration and decoration settings.

pub(crate) mod config;
pub(crate) mod decoration;
