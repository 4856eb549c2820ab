pub mod error;
pub mod fetcher;
pub mod ncss;
pub mod processing;
pub mod resample;
pub mod source;
