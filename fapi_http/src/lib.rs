pub mod client;
pub mod errors;
pub mod futures;
pub mod serde_helpers;
pub mod types;

pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use errors::HttpError;
pub use errors::Result;
pub use futures::FuturesClient;
pub use futures::FuturesClientBuilder;
