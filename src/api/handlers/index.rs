use crate::AppState;
use crate::api::error::AppError;
use axum::{extract::State, response::Html};
use minijinja::{Environment, context};

pub const INDEX_TEMPLATE: &str = "index.html";

/// Builds the template environment once at startup.
pub fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE, include_str!("../../../templates/index.html"))?;
    Ok(env)
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let region = state.config.deploy_region.as_deref().unwrap_or("unknown");

    let page = state
        .templates
        .get_template(INDEX_TEMPLATE)
        .and_then(|tmpl| {
            tmpl.render(context! {
                region => region,
                max_upload_mib => state.config.max_upload_bytes / 1024 / 1024,
            })
        })
        .map_err(|e| AppError::Internal(format!("Failed to render index: {}", e)))?;

    Ok(Html(page))
}
