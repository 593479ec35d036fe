use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{
    accounts, classrooms, courses, departments, export, schedule, session, status,
};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

/// Creates a router that can be used by `axum`.
///
/// Every route except `/health` and `/login` requires a session token;
/// mutating handlers additionally check for the admin role themselves.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Routes that require an authenticated session
    let session_router = Router::new()
        .route("/departments", get(departments::get_departments))
        .route("/departments", post(departments::post_department))
        .route("/departments/:id", delete(departments::delete_department))
        .route("/courses", get(courses::get_courses))
        .route("/courses", post(courses::post_course))
        .route("/courses/:id", put(courses::put_course))
        .route("/courses/:id", delete(courses::delete_course))
        .route("/classrooms", get(classrooms::get_classrooms))
        .route("/classrooms", post(classrooms::post_classroom))
        .route("/classrooms/:id", put(classrooms::put_classroom))
        .route("/classrooms/:id", delete(classrooms::delete_classroom))
        .route("/accounts", get(accounts::get_accounts))
        .route("/accounts", post(accounts::post_account))
        .route("/accounts/:id", delete(accounts::delete_account))
        .route("/schedule", get(schedule::get_schedule))
        .route("/schedule", post(schedule::post_schedule_entry))
        .route("/schedule/:id", delete(schedule::delete_schedule_entry))
        .route("/export/schedule", get(export::get_schedule_export))
        .route(
            "/export/academic_years",
            get(export::get_academic_year_export),
        )
        .route("/logout", post(session::post_logout))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            session_validator::check_session,
        ));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/login", post(session::post_login))
        .merge(session_router)
        .with_state(app_state.clone())
}
