//! Live adapters that talk to real services.

pub mod customers_canvas;
pub mod http_fetcher;
pub mod system_browser;
