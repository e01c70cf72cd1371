use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::{Environment, Error};

#[derive(Debug, Clone)]
pub struct Views {
    pub env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new(env: Environment<'static>) -> Self {
        Self { env: Arc::new(env) }
    }

    /// Environment with every page template of the service registered.
    pub fn load() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("views/base.html"))?;
        crate::notes::add_templates(&mut env)?;
        Ok(Self::new(env))
    }

    pub fn response<D: serde::Serialize>(&self, key: &str, data: D) -> Response {
        match self.render(key, data) {
            Ok(x) => Html(x).into_response(),
            Err(err) => {
                tracing::error!("failed to render {key}: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }

    /// Renders a template, or a single block of it with `template.html#block`.
    pub fn render<D: serde::Serialize>(&self, key: &str, data: D) -> Result<String, Error> {
        if let Some((template_name, block_name)) = key.split_once('#') {
            let template = self.env.get_template(template_name)?;
            return template.eval_to_state(&data)?.render_block(block_name);
        }

        self.env.get_template(key)?.render(&data)
    }
}

impl<S> FromRequestParts<S> for Views
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
