use crate::api::AppState;
use crate::api::schemas::auth::{Account, Credentials};
use crate::error::Result;
use axum::{Form, Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn register(State(state): State<AppState>, Form(payload): Form<Credentials>) -> Result<impl IntoResponse> {
    let user = state.account_service.register(payload.username, payload.password).await?;
    Ok((StatusCode::CREATED, Json(Account::from(user))))
}

pub async fn login(State(state): State<AppState>, Form(payload): Form<Credentials>) -> Result<impl IntoResponse> {
    let user = state.account_service.login(payload.username, payload.password).await?;
    Ok(Json(Account::from(user)))
}
