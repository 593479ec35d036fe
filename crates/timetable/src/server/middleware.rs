//! Request middleware.

pub mod session_validator {
    use axum::{
        extract::{Request, State},
        http::{header, StatusCode},
        middleware::Next,
        response::{IntoResponse, Response},
    };
    use std::sync::Arc;

    use crate::server::types::ApiErrorType;
    use crate::types::AppState;

    /// Resolves the bearer token to a live session and stores it in the
    /// request extensions. Requests without a valid session get 401;
    /// role checks happen in the handlers themselves.
    pub async fn check_session(
        State(state): State<Arc<AppState>>,
        mut req: Request,
        next: Next,
    ) -> Response {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let session = match token.and_then(|t| state.sessions.get(t)) {
            Some(session) => session,
            None => {
                return ApiErrorType::from((
                    StatusCode::UNAUTHORIZED,
                    "Missing or expired session token",
                    None,
                ))
                .into_response();
            }
        };

        req.extensions_mut().insert(session);
        next.run(req).await
    }
}
