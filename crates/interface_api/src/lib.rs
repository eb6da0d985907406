//! HTTP API Layer
//!
//! This crate provides the REST API for the tuition ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for collections, dues, and statistics
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(store, clock, currency, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use core_kernel::{CampusClock, Currency};
use domain_tuition::{StatisticsAggregator, TuitionService};
use infra_store::{MemoryStore, RosterRepository, TuitionRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{health, ledger, payments, statistics, students};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TuitionService>,
    pub stats: Arc<StatisticsAggregator>,
    pub clock: CampusClock,
    pub currency: Currency,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `store` - Storage backend shared with whoever seeds the roster
/// * `clock` - Campus clock dues are computed against
/// * `currency` - Currency all amounts are booked in
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(
    store: MemoryStore,
    clock: CampusClock,
    currency: Currency,
    config: ApiConfig,
) -> Router {
    let roster = Arc::new(RosterRepository::new(store.clone()));
    let tuition = Arc::new(TuitionRepository::new(store));

    let service = Arc::new(
        TuitionService::new(
            tuition.clone(),
            roster.clone(),
            roster.clone(),
            clock,
            currency,
        )
        .with_max_retries(config.allocation_retries),
    );
    let stats = Arc::new(StatisticsAggregator::new(
        tuition,
        roster.clone(),
        roster,
        currency,
    ));

    let state = AppState {
        service,
        stats,
        clock,
        currency,
        config,
    };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Collection routes
    let payment_routes = Router::new()
        .route("/payments", post(payments::collect_payment))
        .route("/invoices/:id", delete(payments::delete_invoice));

    // Student routes
    let student_routes = Router::new()
        .route("/:id/due", get(students::outstanding_due))
        .route(
            "/:id/enrollments/:enrollment_id/history",
            get(students::payment_history),
        );

    // Ledger routes
    let ledger_routes = Router::new().route("/", get(ledger::list_entries));

    // Statistics routes
    let statistics_routes = Router::new()
        .route("/", get(statistics::overview))
        .route("/unpaid", get(statistics::unpaid_students));

    // API routes
    let api_routes = Router::new()
        .merge(payment_routes)
        .nest("/students", student_routes)
        .nest("/ledger", ledger_routes)
        .nest("/statistics", statistics_routes);

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
