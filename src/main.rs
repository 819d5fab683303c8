use actix_web::{self, middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use visual_tagging::{
    client::{
        PreviewRegistry, RpcClient, UploadFile, UploadOrchestrator, UploadOutcome, UploadState,
    },
    configs,
    constants::{DEFAULT_APP_URL, MAX_REQUEST_BYTES},
    modules::{
        self,
        classification::HuggingFaceGateway,
        image_analysis::{AnalysisRepositoryHttp, ImageAnalysisService},
    },
    ENV,
};

#[derive(Parser)]
#[command(name = "visual-tagging", version, about = "Image upload and visual tagging service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Upload images to a running server and print their tags
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, env = "APP_URL", default_value = DEFAULT_APP_URL)]
        server: String,
        #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
        timeout: u64,
    },
    /// Ask a running server whether it is up
    Health {
        #[arg(long, env = "APP_URL", default_value = DEFAULT_APP_URL)]
        server: String,
    },
}

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve().await,
        Command::Upload { paths, server, timeout } => {
            tracing_subscriber::fmt().with_target(false).init();
            upload(paths, &server, timeout).await
        }
        Command::Health { server } => {
            let http = configs::build_http_client(10)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            let health = RpcClient::new(http, &server)
                .health_check()
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            println!("{} at {}: {}", health.status, health.timestamp.to_rfc3339(), health.message);
            Ok(())
        }
    }
}

async fn serve() -> std::io::Result<()> {
    let http = configs::build_http_client(ENV.http_timeout_secs)
        .map_err(|_| std::io::Error::other("HTTP client error"))?;

    if ENV.hugging_face_token.is_none() {
        log::warn!("HUGGING_FACE_API_TOKEN is not set; classification requests will be rejected");
    }

    let repo = AnalysisRepositoryHttp::new(http.clone(), &ENV.app_url);
    let gateway = HuggingFaceGateway::new(
        http,
        ENV.inference_url.clone(),
        ENV.hugging_face_token.clone(),
    );
    let service = ImageAnalysisService::with_dependencies(
        Arc::new(repo),
        Arc::new(gateway),
        ENV.model_id.clone(),
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configs::cors())
            .app_data(web::Data::new(service.clone()))
            .app_data(web::JsonConfig::default().limit(MAX_REQUEST_BYTES))
            .app_data(web::PayloadConfig::new(MAX_REQUEST_BYTES))
            .service(health_check)
            .service(web::scope("/api").configure(modules::image_analysis::route::configure))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}

async fn upload(paths: Vec<PathBuf>, server: &str, timeout: u64) -> std::io::Result<()> {
    let http =
        configs::build_http_client(timeout).map_err(|e| std::io::Error::other(e.to_string()))?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadFile::from_path(&path).await {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("{}: {}", path.display(), e),
        }
    }

    let orchestrator = UploadOrchestrator::new(
        Arc::new(Mutex::new(UploadState::new())),
        Arc::new(RpcClient::new(http, server)),
        PreviewRegistry::new(),
    );

    for (name, outcome) in orchestrator.process_files(files).await {
        if let UploadOutcome::Rejected(message) = outcome {
            eprintln!("{name}: {message}");
        }
    }

    let state = orchestrator.state();
    let state = state.lock().await;
    for entry in state.uploads() {
        println!("{entry}");
    }
    Ok(())
}
