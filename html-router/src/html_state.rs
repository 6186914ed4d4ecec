use std::sync::Arc;

use minijinja::Environment;
use tracing::debug;

#[derive(Clone)]
pub struct HtmlState {
    pub templates: Arc<Environment<'static>>,
}

impl HtmlState {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        debug!("Template engine configured for html_router.");
        Ok(Self {
            templates: Arc::new(env),
        })
    }
}
