use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/activities",
            get(handlers::activity::list_activities).post(handlers::activity::create_activity),
        )
        .route(
            "/api/activities/:id",
            get(handlers::activity::get_activity)
                .put(handlers::activity::update_activity)
                .delete(handlers::activity::delete_activity),
        )
        .route(
            "/api/activities/:id/approval",
            put(handlers::activity::set_approval),
        )
        .route(
            "/api/categories",
            get(handlers::activity::list_categories).post(handlers::activity::create_category),
        )
}
