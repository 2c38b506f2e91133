//! HTTP handlers for subscription endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::purchase::StartSubscriptionCheckoutCommand;
use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, GetSubscriptionQuery,
};

use super::super::dto::{CheckoutRequest, CheckoutResponse};
use super::super::error::ApiError;
use super::super::middleware::AuthenticatedUser;
use super::super::state::AppState;
use super::dto::SubscriptionResponse;

/// GET /subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .get_subscription
        .handle(GetSubscriptionQuery { user_id: user.user_id })
        .await?;
    Ok(Json(SubscriptionResponse::new(
        &view.subscription,
        Some(view.has_seller_access),
    )))
}

/// POST /subscription/checkout
pub async fn start_subscription_checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .subscription_checkout
        .handle(StartSubscriptionCheckoutCommand {
            user_id: user.user_id,
            provider: request.provider()?,
        })
        .await?;

    let status = if result.reused { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(CheckoutResponse::from(result))))
}

/// POST /subscription/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .cancel_subscription
        .handle(CancelSubscriptionCommand { user_id: user.user_id })
        .await?;
    Ok(Json(SubscriptionResponse::new(&result.subscription, None)))
}
