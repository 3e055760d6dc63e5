//! Compositors and the batch runner that drives them.

pub(crate) mod batch;
pub(crate) mod output;
pub(crate) mod raster;
pub(crate) mod region;
pub(crate) mod split;
pub(crate) mod vector;
