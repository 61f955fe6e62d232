//! KMNIST demo web server binary.

use std::env;
use std::sync::Arc;

use kana_classifier::{ConvNetClassifier, Device};
use kana_web::{app, logging, AppState, Config};
use tokio::net::TcpListener;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("kana-web {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| format!("Failed to load configuration: {}", e))?;

    logging::init(&config.logging.level);
    tracing::info!("Starting kana-web {}", VERSION);
    tracing::info!("Working directory: {}", env::current_dir()?.display());

    // Load the classifier once; every request shares it
    let classifier = ConvNetClassifier::load(&config.model.weights_path, Device::Cpu)?;
    let state = Arc::new(AppState::new(config.clone(), Arc::new(classifier)));

    // Upload directory self-test; a failure is reported but not fatal
    let upload_dir = state.uploads.dir().to_path_buf();
    match state.uploads.check_writable().await {
        Ok(()) => tracing::info!("Upload directory {} is writable", upload_dir.display()),
        Err(e) => tracing::error!(
            "Upload directory {} is not writable: {}",
            upload_dir.display(),
            e
        ),
    }

    let app = app(state);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
