use std::sync::{Arc, OnceLock};

use crate::error_responses;
use axum::{
    extract::{rejection::QueryRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::{
    schema::{Schema, SchemaObject, SubschemaValidation},
    schema_for, JsonSchema,
};
use serde::Serialize;
use serde_json::Value;

pub use response::{ErrorResponse, ErrorResponseDocs};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),

    // validation
    #[error("validation")]
    QueryValidation(#[from] QueryRejection),

    // managed backend, carrying its message
    #[error("fetch_failed")]
    Fetch(String),

    #[error(transparent)]
    DB(crate::db::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected")]
    Unexpected(String),
}

impl From<crate::db::Error> for Error {
    fn from(error: crate::db::Error) -> Self {
        match error {
            crate::db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

// Response

error_responses! {
    not_found: 404,
    query_validation: 400,
    backend_unavailable: 502,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::QueryValidation(error) => errors.query_validation.with_message(error.body_text()),
            // the backend message is shown to the user as is
            Error::Fetch(message) => errors.backend_unavailable.with_message(message),
            Error::Unexpected(message) => errors.unexpected.with_message(message),
            _ => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

/// Logs every error carried by a response.
pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if let Some(error) = response.extensions().get::<Arc<Error>>() {
        tracing::error!("{:?}", error);
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, Default, JsonSchema)]
    pub struct ErrorResponse {
        pub error: String,
        pub message: Option<String>,
        pub status: u16,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }
    }

    /// `ErrorResponse` documented as one variant per known error kind.
    pub struct ErrorResponseDocs;

    impl JsonSchema for ErrorResponseDocs {
        fn schema_name() -> String {
            String::from("ErrorResponse")
        }

        fn json_schema(_: &mut schemars::gen::SchemaGenerator) -> Schema {
            let variants = errors()
                .all()
                .into_iter()
                .map(|known| {
                    let mut schema = schema_for!(ErrorResponse).schema;
                    let properties = &mut schema.object().properties;
                    if let Some(Schema::Object(status)) = properties.get_mut("status") {
                        status.enum_values = Some(vec![Value::from(known.status)]);
                    }
                    if let Some(Schema::Object(error)) = properties.get_mut("error") {
                        error.enum_values = Some(vec![Value::from(known.error.clone())]);
                    }
                    Schema::from(schema)
                })
                .collect::<Vec<_>>();

            SchemaObject {
                subschemas: Some(Box::new(SubschemaValidation {
                    one_of: Some(variants),
                    ..Default::default()
                })),
                ..Default::default()
            }
            .into()
        }
    }

    /// Declares the known error kinds with their status codes.
    /// ```rust
    /// error_responses! {
    ///     not_found: 404,
    ///     unexpected: 500
    /// }
    ///
    /// let errors = errors(); // <- from macro
    /// errors.not_found.with_message("Note not found");
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            impl Responses {
                fn all(&self) -> Vec<&ErrorResponse> {
                    vec![$(&self.$name),*]
                }
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_keep_the_backend_message() {
        let error = Error::Fetch("Database connection failed".into());

        let response = ErrorResponse::from(&error);
        assert_eq!(response.status, 502);
        assert_eq!(response.error, "backend_unavailable");
        assert_eq!(response.message.as_deref(), Some("Database connection failed"));
    }

    #[test]
    fn database_errors_hide_their_details() {
        let error = Error::from(crate::db::Error::Rusqlite(rusqlite::Error::InvalidQuery));
        assert_eq!(ErrorResponse::from(&error).message.as_deref(), Some("Unexpected"));
    }

    #[test]
    fn docs_list_every_error_kind() {
        let schema = schemars::schema_for!(ErrorResponseDocs);
        let variants = schema
            .schema
            .subschemas
            .and_then(|s| s.one_of)
            .map(|v| v.len());
        assert_eq!(variants, Some(4));
    }
}
