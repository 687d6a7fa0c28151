pub(crate) mod model;
pub(crate) mod reducer;
pub(crate) mod session;
