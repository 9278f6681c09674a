pub mod client;
pub mod errors;
pub mod pipeline;
pub mod text;
pub mod types;

pub use client::{Fetcher, MAX_BODY_BYTES, MAX_REFERENCE_CHARS};
pub use errors::FetchError;
pub use types::{Charset, PageResponse};
