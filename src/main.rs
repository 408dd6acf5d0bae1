//! Casegen server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use casegen_lib::api::{self, ApiDoc};
use casegen_lib::auth::AdminKey;
use casegen_lib::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, Config};
use casegen_lib::db::DbPool;
use casegen_lib::middleware::RequestLogger;
use casegen_lib::services::{self, PipelineSettings};
use casegen_lib::services::generator::{GeminiGenerator, TextGenerator};

/// JSON body limit; screenshots arrive base64-encoded.
const JSON_PAYLOAD_LIMIT: usize = 32 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and GENERATOR_API_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Casegen Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let generator: Arc<dyn TextGenerator> = match GeminiGenerator::new(&config.generator) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            error!("Failed to initialize text generator: {}", e);
            std::process::exit(1);
        }
    };
    if config.generator.api_key.is_none() {
        warn!("GENERATOR_API_KEY is not set; generation endpoints will return 502");
    }
    info!(
        model = %config.generator.model,
        timeout_secs = config.generator.timeout_secs,
        "Text generator configured"
    );

    let bind_address = config.bind_address();
    let admin_key = AdminKey::new(config.admin_key.clone());
    let settings = PipelineSettings::from_config(&config);
    let is_development = config.is_development();
    let generator = web::Data::from(generator);

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };
    info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .allowed_header(API_KEY_HEADER)
            .allowed_header(ADMIN_KEY_HEADER)
            .max_age(3600);
        let cors = if is_development {
            cors.allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
        } else {
            cors
        };

        App::new()
            // CORS must wrap before the logger
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(web::Data::new(settings))
            .app_data(generator.clone())
            .app_data(web::JsonConfig::default().limit(JSON_PAYLOAD_LIMIT))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_project_routes)
                    .configure(api::configure_generation_routes)
                    .configure(api::configure_test_case_routes)
                    .configure(api::configure_analysis_routes)
                    .configure(services::configure_auth_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
