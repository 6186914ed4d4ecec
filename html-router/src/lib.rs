use axum::{extract::FromRef, routing::get, Router};
use html_state::HtmlState;

pub mod html_state;
mod routes;

/// Html routes
pub fn html_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route("/", get(routes::index::landing_page))
}
