use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::{Form, Json};
use serde::Deserialize;

use crate::auth::AccessToken;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// `POST /token`
///
/// Credentials come from a urlencoded form body or, failing that, from the
/// query string.
pub async fn issue_token(
    State(state): State<AppState>,
    query: Result<Query<TokenRequest>, QueryRejection>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> ApiResult<Json<AccessToken>> {
    let request = match (form, query) {
        (Ok(Form(request)), _) => request,
        (Err(_), Ok(Query(request))) => request,
        (Err(rejection), Err(_)) => return Err(rejection.into()),
    };

    let token = state
        .auth
        .issue_token(&request.username, &request.password)?;

    Ok(Json(token))
}
