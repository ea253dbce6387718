pub mod client;
pub mod models;
pub mod response;
pub mod streaming;

pub use client::{check_status, make_api_request};
pub use models::RequestBody;
pub use streaming::{process_streaming_response, StreamingResult};
