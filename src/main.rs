use axum::{
    routing::{get, post},
    Router,
};
use edutrack_backend::{config::Config, database::pool::create_pool, routes, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;

    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool, config.clone());

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let learning_api = Router::new()
        .route(
            "/api/path/generate_learning_path",
            post(routes::path_routes::generate_learning_path)
                .get(routes::path_routes::list_learning_paths),
        )
        .route(
            "/api/tasks/create-tasks",
            post(routes::task_routes::create_tasks),
        )
        .route(
            "/api/tasks/student-tasks",
            get(routes::task_routes::list_student_tasks),
        )
        .layer(axum::middleware::from_fn_with_state(
            edutrack_backend::middleware::rate_limit::new_rps_state(config.public_rps),
            edutrack_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(learning_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
