pub mod billing;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{BillingOrchestrator, MongoMembershipStore, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<BillingOrchestrator>,
}

pub struct Application {
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        services::init_metrics();

        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("membership-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let store = MongoMembershipStore::new(client, db);
        store.init_indexes().await?;

        let orchestrator = Arc::new(BillingOrchestrator::new(
            Arc::new(store),
            Arc::new(SystemClock),
        ));

        // Seed the pricing catalog on first startup.
        let catalog = orchestrator.catalog().await?;
        tracing::info!(
            gym = %catalog.gym_name,
            plans = catalog.plans.len(),
            "Pricing catalog loaded"
        );

        let state = AppState {
            config: config.clone(),
            orchestrator,
        };

        let router = Self::router(state);

        Ok(Self {
            port: config.server.port,
            router,
        })
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            // Members
            .route("/members", post(handlers::members::enroll_member))
            .route("/members", get(handlers::members::list_members))
            .route(
                "/members/expiring-soon",
                get(handlers::members::expiring_members),
            )
            .route("/members/:id", get(handlers::members::get_member))
            .route("/members/:id", put(handlers::members::update_member))
            .route("/members/:id", delete(handlers::members::delete_member))
            .route(
                "/members/:id/status",
                patch(handlers::members::update_member_status),
            )
            .route("/members/:id/plan", put(handlers::members::change_plan))
            .route(
                "/members/:id/start-date",
                put(handlers::members::set_start_date),
            )
            .route(
                "/members/:id/end-date",
                put(handlers::members::set_end_date),
            )
            // Payments
            .route("/payments", post(handlers::payments::record_payment))
            .route("/payments", get(handlers::payments::list_payments))
            .route(
                "/payments/member/:id",
                get(handlers::payments::member_payments),
            )
            // Dashboard
            .route("/dashboard/stats", get(handlers::dashboard::dashboard_stats))
            // Settings and pricing catalog
            .route("/settings", get(handlers::catalog::get_settings))
            .route("/settings", put(handlers::catalog::update_settings))
            .route("/settings/plans/:key", get(handlers::catalog::get_plan))
            .route("/settings/plans/:key", put(handlers::catalog::update_plan))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                }),
            )
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
