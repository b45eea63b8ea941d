pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{MethodRouter, get},
};
use sitedesk_api_types::{AboutUs, HomePage, SharedSettings};

use crate::domain::documents::SingletonDocument;

/// Read-only routes. The public listener serves only these.
pub fn build_read_router() -> Router<ApiState> {
    Router::new()
        .route("/api/v1/get-data", get(handlers::get_data))
        .route(
            "/api/v1/shared",
            get(handlers::get_singleton::<SharedSettings>),
        )
        .route("/api/v1/homepage", get(handlers::get_homepage))
        .route("/api/v1/aboutus", get(handlers::get_singleton::<AboutUs>))
        .route("/api/v1/products", get(handlers::list_products))
        .route("/api/v1/products/{id}", get(handlers::get_product))
}

/// Reads plus every write, for the admin listener.
pub fn build_admin_api_router() -> Router<ApiState> {
    Router::new()
        .route("/api/v1/get-data", get(handlers::get_data))
        .route(
            "/api/v1/shared",
            singleton_routes::<SharedSettings>(get(handlers::get_singleton::<SharedSettings>)),
        )
        .route(
            "/api/v1/homepage",
            singleton_routes::<HomePage>(get(handlers::get_homepage)),
        )
        .route(
            "/api/v1/aboutus",
            singleton_routes::<AboutUs>(get(handlers::get_singleton::<AboutUs>)),
        )
        .route(
            "/api/v1/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/v1/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn singleton_routes<D: SingletonDocument>(
    read: MethodRouter<ApiState>,
) -> MethodRouter<ApiState> {
    read.post(handlers::upsert_singleton::<D>)
        .delete(handlers::reset_singleton::<D>)
}
