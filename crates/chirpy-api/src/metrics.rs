use std::sync::atomic::Ordering;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::auth::AppState;

/// Count a static file server hit once the response is ready.
pub async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    state.hits.fetch_add(1, Ordering::Relaxed);
    resp
}

/// GET /admin/metrics
pub async fn metrics_page(State(state): State<AppState>) -> Html<String> {
    let hits = state.hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>
<body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
</body>
</html>
",
        hits
    ))
}

/// /api/reset: zero the hit counter.
pub async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.hits.store(0, Ordering::Relaxed);
    healthz().await
}

/// GET /api/healthz
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}
