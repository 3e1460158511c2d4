use blood_donor_registry::{
    adapters::{clock::SystemClock, postgres::PostgresDonorRepository},
    api::{handlers::AppState, router::create_router},
    application::donor::ServiceDependencies,
    config::AppConfig,
    domain::EligibilityPolicy,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blood_donor_registry=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!(
        cooldown_days = config.cooldown_days,
        availability_mode = ?config.availability_mode,
        "Eligibility policy configured"
    );

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Create service dependencies
    let service_deps = ServiceDependencies {
        donor_repository: Arc::new(PostgresDonorRepository::new(pool)),
        clock: Arc::new(SystemClock::new()),
        policy: EligibilityPolicy::new(config.cooldown_days),
        availability_mode: config.availability_mode,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
