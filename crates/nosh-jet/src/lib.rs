mod api_interfaces;
pub mod client;
pub mod constants;
pub mod error;
pub mod postcode;
pub mod restaurant;
mod util;

pub use client::{Client, ClientConfig, ClientConfigBuilder};
pub use error::GetError;
pub use postcode::Postcode;
pub use restaurant::Restaurant;
pub use util::default_http_client;
