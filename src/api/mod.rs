mod client;
mod errors;

pub use client::{HttpClient, UploadClient};
pub use errors::{ApiError, Result};
