use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use super::{validation_exception, Validate};
use crate::errors::{HttpException, RaisedError};

/// JSON body that is deserialized into `T` and then validated.
///
/// Bodies with unknown fields are rejected when `T` is declared with
/// `#[serde(deny_unknown_fields)]`. Deserialization problems (unknown field,
/// wrong type, missing field) and failed validation both raise a 422; malformed
/// JSON raises a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = RaisedError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection_exception)?;

        value.validate().map_err(|errors| validation_exception(&errors))?;

        Ok(Self(value))
    }
}

fn json_rejection_exception(rejection: JsonRejection) -> HttpException {
    let status = match &rejection {
        JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => rejection.status(),
    };
    HttpException::with_message(status, rejection.body_text())
}
