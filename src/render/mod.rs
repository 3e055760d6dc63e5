//! Rendering backends for figure plans.

pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod surface;
pub(crate) mod svg;
pub(crate) mod text;
