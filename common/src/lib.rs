pub mod config;
pub mod format;
pub mod load;
pub mod plot;
pub mod sample;
pub mod util;
