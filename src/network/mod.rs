pub mod api;
pub mod client;
pub mod esp;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use api::ControllerApi;
pub use client::DashboardClient;
pub use esp::EspClient;
pub use transport::{ApiRequest, ApiResponse, ApiService, TransportBuilder};
