mod client;
mod registry;

pub use client::ProviderClient;
pub use registry::{ProviderKind, ProviderSpec};
