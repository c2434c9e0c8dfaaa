pub mod analysis;
pub mod commands;
pub mod contracts;
pub mod error;
pub mod extract;
pub mod paths;
pub mod workbook;

pub use contracts::envelope::SuccessEnvelope;
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
