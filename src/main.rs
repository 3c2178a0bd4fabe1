use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use informate_server::auth::policy::AnyAuthenticated;
use informate_server::auth::AuthCodec;
use informate_server::config::Config;
use informate_server::images::InlineImageSink;
use informate_server::routes::create_routes;
use informate_server::state::AppState;
use informate_server::store::postgres::PgEventStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let state = AppState {
        store: Arc::new(PgEventStore::new(pool)),
        auth: AuthCodec::new(config.jwt_secret.as_bytes()),
        images: Arc::new(InlineImageSink),
        policy: Arc::new(AnyAuthenticated),
    };

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
