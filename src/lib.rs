pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod interactive;
pub mod session;
pub mod source;
pub mod uploader;

pub use skin_intake_common as common;
