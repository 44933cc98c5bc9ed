pub mod client;
pub mod error;
pub mod export;
pub mod types;

pub use client::SisenseClient;
pub use error::{Result, SisenseError};
pub use export::TabularExport;
pub use types::{BuildStatusResponse, LoginResponse, StartBuildRequest, WidgetTable};
