//! Route definitions for the Quantity Surveying Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - projects
        .nest("/projects", project_routes())
        // Protected routes - item catalog
        .nest("/items", item_routes())
        // Protected routes - bills of quantities
        .nest("/boqs", boq_routes())
        // Protected routes - valuations
        .nest("/valuations", valuation_routes())
        // Protected routes - payment certificates
        .nest("/payment-certificates", payment_certificate_routes())
        // Protected routes - variation orders
        .nest("/variation-orders", variation_order_routes())
        // Protected routes - cost plans
        .nest("/cost-plans", cost_plan_routes())
        // Protected routes - final accounts
        .nest("/final-accounts", final_account_routes())
        // Protected routes - tendering
        .nest("/tenders", tender_routes())
        // Protected routes - reports
        .nest("/reports", reporting_routes())
        // Protected routes - rate suggestion
        .nest("/rates", rate_routes())
        // Protected routes - BIM import
        .nest("/bim", bim_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
        // Protected routes - module settings
        .nest("/settings", settings_routes())
}

/// Project routes (protected)
fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_projects).post(handlers::create_project))
        .route(
            "/:project_id",
            get(handlers::get_project).put(handlers::update_project),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Item catalog routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/:item_code", get(handlers::get_item))
        .route("/:item_code/rate-history", get(handlers::item_rate_history))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Bill of Quantities routes (protected)
fn boq_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_boqs).post(handlers::create_boq))
        .route("/:boq_id", get(handlers::get_boq).put(handlers::update_boq))
        .route("/:boq_id/submit", post(handlers::submit_boq))
        .route("/:boq_id/cancel", post(handlers::cancel_boq))
        .route("/:boq_id/duplicate", post(handlers::duplicate_boq))
        .route("/:boq_id/items", get(handlers::get_boq_items))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Valuation routes (protected)
fn valuation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_valuations).post(handlers::create_valuation),
        )
        .route(
            "/:valuation_id",
            get(handlers::get_valuation).put(handlers::update_valuation),
        )
        .route("/:valuation_id/submit", post(handlers::submit_valuation))
        .route("/:valuation_id/cancel", post(handlers::cancel_valuation))
        .route("/boqs/:boq_id/items", get(handlers::boq_items_for_valuation))
        .route(
            "/boqs/:boq_id/previous-total",
            get(handlers::previous_valuation_total),
        )
        .route(
            "/boqs/:boq_id/previous-data",
            get(handlers::previous_valuation_data),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Payment certificate routes (protected)
fn payment_certificate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_certificates).post(handlers::create_certificate),
        )
        .route(
            "/:certificate_id",
            get(handlers::get_certificate).put(handlers::update_certificate),
        )
        .route("/:certificate_id/submit", post(handlers::submit_certificate))
        .route("/:certificate_id/cancel", post(handlers::cancel_certificate))
        .route(
            "/projects/:project_id/previous-payments",
            get(handlers::get_previous_payments),
        )
        .route(
            "/projects/:project_id/retention-rate",
            get(handlers::get_project_retention_rate),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Variation order routes (protected)
fn variation_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_variations).post(handlers::create_variation),
        )
        .route(
            "/:variation_id",
            get(handlers::get_variation).put(handlers::update_variation),
        )
        .route("/:variation_id/submit", post(handlers::submit_variation))
        .route("/:variation_id/cancel", post(handlers::cancel_variation))
        .route("/:variation_id/approve", post(handlers::approve_variation))
        .route("/:variation_id/reject", post(handlers::reject_variation))
        .route("/boqs/:boq_id/items", get(handlers::boq_items_for_variation))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Cost plan routes (protected)
fn cost_plan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_cost_plans).post(handlers::create_cost_plan),
        )
        .route(
            "/:plan_id",
            get(handlers::get_cost_plan).put(handlers::update_cost_plan),
        )
        .route("/:plan_id/submit", post(handlers::submit_cost_plan))
        .route("/:plan_id/cancel", post(handlers::cancel_cost_plan))
        .route("/:plan_id/create-boq", post(handlers::create_boq_from_cost_plan))
        .route("/projects/:project_id/analysis", get(handlers::cost_analysis))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Final account routes (protected)
fn final_account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_final_accounts).post(handlers::create_final_account),
        )
        .route(
            "/:account_id",
            get(handlers::get_final_account).put(handlers::update_final_account),
        )
        .route("/:account_id/submit", post(handlers::submit_final_account))
        .route("/:account_id/agree", post(handlers::agree_final_account))
        .route("/:account_id/cancel", post(handlers::cancel_final_account))
        .route(
            "/:account_id/load-project-data",
            post(handlers::load_project_data),
        )
        .route("/:account_id/analysis", get(handlers::final_account_analysis))
        .route(
            "/:account_id/create-final-payment",
            post(handlers::create_final_payment),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Tender routes (protected)
fn tender_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/packages",
            get(handlers::list_tender_packages).post(handlers::create_tender_package),
        )
        .route(
            "/packages/:package_id",
            get(handlers::get_tender_package).put(handlers::update_tender_package),
        )
        .route(
            "/packages/:package_id/submit",
            post(handlers::submit_tender_package),
        )
        .route(
            "/packages/:package_id/cancel",
            post(handlers::cancel_tender_package),
        )
        .route(
            "/packages/:package_id/award",
            post(handlers::award_tender_package),
        )
        .route(
            "/packages/:package_id/comparison",
            get(handlers::tender_comparison),
        )
        .route(
            "/packages/:package_id/quotes",
            get(handlers::list_tender_quotes),
        )
        .route("/quotes", post(handlers::create_tender_quote))
        .route(
            "/quotes/:quote_id",
            get(handlers::get_tender_quote).put(handlers::update_tender_quote),
        )
        .route("/quotes/:quote_id/submit", post(handlers::submit_tender_quote))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/:project_id/financial-summary",
            get(handlers::project_financial_summary),
        )
        .route(
            "/projects/:project_id/boq-summary",
            get(handlers::boq_summary),
        )
        .route(
            "/projects/:project_id/variation-analysis",
            get(handlers::variation_analysis),
        )
        .route(
            "/projects/:project_id/payment-summary",
            get(handlers::payment_summary),
        )
        .route(
            "/projects/:project_id/financial-summary.csv",
            get(handlers::export_financial_summary),
        )
        .route(
            "/boqs/:boq_id/valuation-progress",
            get(handlers::valuation_progress),
        )
        .route("/boqs/:boq_id/export.csv", get(handlers::export_boq))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Rate suggestion routes (protected)
fn rate_routes() -> Router<AppState> {
    Router::new()
        .route("/suggestion", get(handlers::intelligent_defaults))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// BIM import routes (protected)
fn bim_routes() -> Router<AppState> {
    Router::new()
        .route("/import", post(handlers::import_bim_elements))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/unread-count", get(handlers::unread_count))
        .route("/mark-all-read", post(handlers::mark_all_as_read))
        .route("/:notification_id/read", post(handlers::mark_as_read))
        .route(
            "/triggers/payment-reminders",
            post(handlers::trigger_payment_reminders),
        )
        .route(
            "/triggers/budget-alerts",
            post(handlers::trigger_budget_alerts),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Settings routes (protected)
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
