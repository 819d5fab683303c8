pub const DEFAULT_MODEL: &str = "google/vit-base-patch16-224";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_APP_URL: &str = "http://127.0.0.1:8080";
// base64 inflates a 10MB image to ~13.4MB
pub const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

pub struct Env {
    pub hugging_face_token: Option<String>,
    pub inference_url: String,
    pub model_id: String,
    pub app_url: String,
    pub frontend_url: String,
    pub http_timeout_secs: u64,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let hugging_face_token =
            std::env::var("HUGGING_FACE_API_TOKEN").ok().filter(|token| !token.trim().is_empty());

        let inference_url = std::env::var("HUGGING_FACE_INFERENCE_URL")
            .unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string());
        let model_id =
            std::env::var("CLASSIFICATION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let app_url = std::env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .expect("HTTP_TIMEOUT_SECS must be a valid u64 integer");

        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env {
            hugging_face_token,
            inference_url,
            model_id,
            app_url,
            frontend_url,
            http_timeout_secs,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
