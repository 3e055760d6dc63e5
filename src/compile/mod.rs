//! Backend-agnostic drawing plan shared by the raster and vector compositors.

pub(crate) mod objects;
pub(crate) mod plan;
