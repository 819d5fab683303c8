pub mod orchestrator;
pub mod preview;
pub mod rpc_client;
pub mod upload_state;

pub use orchestrator::{UploadFile, UploadOrchestrator, UploadOutcome};
pub use preview::PreviewRegistry;
pub use rpc_client::RpcClient;
pub use upload_state::UploadState;
