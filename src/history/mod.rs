pub mod error;
pub mod history_frame;
pub mod store;
