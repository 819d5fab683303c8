pub mod assembler;
pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_http;
pub mod route;
pub mod schema;
pub mod service;

pub use repository_http::AnalysisRepositoryHttp;
pub use service::ImageAnalysisService;
