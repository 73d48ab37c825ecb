//! Shared helpers: path handling and logging setup

pub mod io;
pub mod logging;

pub use self::{
    io::{derive_output_path, ensure_input_exists, is_same_file},
    logging::{init_logging, LogLevel},
};
