//! HTTP surface. Handlers stay thin: lock the connection, call into the
//! quiz engine or the db layer, serialize the result.

pub mod groups;
pub mod plans;
pub mod quiz;
pub mod words;

use axum::Router;
use axum::routing::{get, post, put};

use crate::db::DbPool;

pub fn router(pool: DbPool) -> Router {
    Router::new()
        .route("/api/quizzes/start", post(quiz::start))
        .route("/api/quizzes/{session_id}/answer", post(quiz::answer))
        .route("/api/quizzes/{session_id}/retry", post(quiz::retry))
        .route("/api/quizzes/{session_id}/progress", get(quiz::progress))
        .route("/api/quizzes/history", get(quiz::history))
        .route(
            "/api/folders",
            post(groups::create_folder).get(groups::list_folders),
        )
        .route(
            "/api/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route("/api/words", post(words::create).get(words::list))
        .route(
            "/api/words/{word_id}",
            axum::routing::patch(words::update).delete(words::remove),
        )
        .route("/api/study-plans", get(plans::list))
        .route(
            "/api/study-plans/{key}",
            put(plans::set_for_date)
                .patch(plans::move_plan)
                .delete(plans::remove),
        )
        .with_state(pool)
}
