pub mod aggregate;
pub mod api;
pub mod config;
pub mod csv_io;
pub mod db;
pub mod error;
pub mod models;
mod main_lib;

pub use error::{Error, Result};
pub use main_lib::{build_state, init_tracing, AppState};
