pub mod controller;
pub mod relay_client;

pub use controller::{StagingController, StatusMessage};
pub use relay_client::{RelayClient, UploadResponse};
