//! Open the Customer's Canvas design editor and save the result to a file.
//!
//! A session opens the editor in the browser, waits for exactly one callback
//! on a local single-threaded listener, writes the delivered design to the
//! working directory and stops.

pub mod adapters;
pub mod app;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
pub mod ports;
pub mod receiver;
pub mod session;

pub use error::SaveError;
