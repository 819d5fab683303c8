pub mod gateway;
pub mod gateway_hf;
pub mod model;

pub use gateway_hf::HuggingFaceGateway;
