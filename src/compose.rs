pub(crate) mod orchestrator;
pub(crate) mod raster;
pub(crate) mod svg;
