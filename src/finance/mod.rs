pub mod amounts;
pub mod format;
