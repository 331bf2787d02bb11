pub(crate) mod geo;
pub mod logging;
pub(crate) mod time;
