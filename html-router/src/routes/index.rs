use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use tracing::error;

use crate::html_state::HtmlState;

pub async fn landing_page(State(state): State<HtmlState>) -> Response {
    let rendered = state
        .templates
        .get_template("index.html")
        .and_then(|template| template.render(context! { title => "Resume Analyzer" }));

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!("Template render error: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<html><body><h1>Error</h1><p>Sorry, something went wrong displaying this page.</p></body></html>"),
            )
                .into_response()
        }
    }
}
