use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/programs",
            get(handlers::program::list_programs).post(handlers::program::create_program),
        )
        .route(
            "/api/programs/:id",
            get(handlers::program::get_program)
                .put(handlers::program::update_program)
                .delete(handlers::program::delete_program),
        )
        .route(
            "/api/programs/:id/entries",
            put(handlers::program::replace_entries),
        )
        .route(
            "/api/programs/:id/entries/reorder",
            post(handlers::program::reorder_entries),
        )
}
