//! HTTP handlers for purchases, checkouts and payment polling.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::purchase::{
    ListUserPurchasesQuery, PurchaseShareCommand, StartShareCheckoutCommand,
};
use crate::application::handlers::sharing::ShareLocator;
use crate::application::handlers::webhook::RefreshPaymentStatusCommand;
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, ShareId};
use crate::domain::sharing::AccessToken;

use super::super::dto::{CheckoutRequest, CheckoutResponse};
use super::super::error::ApiError;
use super::super::middleware::AuthenticatedUser;
use super::super::state::AppState;
use super::dto::{
    PaymentResponse, PurchaseRequest, PurchaseResponse, PurchaseResultResponse,
    ShareCheckoutResponse,
};

fn token_locator(raw: String) -> Result<ShareLocator, ApiError> {
    let token = AccessToken::parse(raw).map_err(DomainError::from)?;
    Ok(ShareLocator::Token(token))
}

async fn purchase(
    state: &AppState,
    user: AuthenticatedUser,
    locator: ShareLocator,
    request: PurchaseRequest,
) -> Result<(StatusCode, Json<PurchaseResultResponse>), ApiError> {
    let result = state
        .purchase_share
        .handle(PurchaseShareCommand {
            locator,
            buyer_id: user.user_id,
            payment_id: request.payment_id.map(PaymentId::from_uuid),
        })
        .await?;

    let status = if result.newly_created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(PurchaseResultResponse {
            purchase: PurchaseResponse::from(&result.purchase),
            newly_created: result.newly_created,
        }),
    ))
}

/// POST /shares/:id/purchase
pub async fn purchase_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    request: Option<Json<PurchaseRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    purchase(&state, user, ShareLocator::Id(ShareId::from_uuid(id)), request).await
}

/// POST /shares/by-token/:token/purchase
pub async fn purchase_by_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(token): Path<String>,
    request: Option<Json<PurchaseRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    purchase(&state, user, token_locator(token)?, request).await
}

/// Starts a checkout; a buyer who already owns the copy gets it back.
async fn checkout(
    state: &AppState,
    user: AuthenticatedUser,
    locator: ShareLocator,
    request: CheckoutRequest,
) -> Result<(StatusCode, Json<ShareCheckoutResponse>), ApiError> {
    let cmd = StartShareCheckoutCommand {
        buyer_id: user.user_id,
        locator: locator.clone(),
        provider: request.provider()?,
    };

    match state.share_checkout.handle(cmd).await {
        Ok(result) => {
            let status = if result.reused { StatusCode::OK } else { StatusCode::CREATED };
            Ok((
                status,
                Json(ShareCheckoutResponse::PaymentRequired(CheckoutResponse::from(result))),
            ))
        }
        Err(e) if e.code == ErrorCode::AlreadyPurchased => {
            let existing = state
                .purchase_share
                .handle(PurchaseShareCommand {
                    locator,
                    buyer_id: user.user_id,
                    payment_id: None,
                })
                .await?;
            Ok((
                StatusCode::OK,
                Json(ShareCheckoutResponse::AlreadyPurchased {
                    purchase: PurchaseResponse::from(&existing.purchase),
                }),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /shares/:id/checkout
pub async fn checkout_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    checkout(&state, user, ShareLocator::Id(ShareId::from_uuid(id)), request).await
}

/// POST /shares/by-token/:token/checkout
pub async fn checkout_by_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(token): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    checkout(&state, user, token_locator(token)?, request).await
}

/// GET /purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = state
        .list_purchases
        .handle(ListUserPurchasesQuery {
            buyer_id: user.user_id,
            limit: None,
        })
        .await?;
    let response: Vec<PurchaseResponse> = purchases.iter().map(PurchaseResponse::from).collect();
    Ok(Json(response))
}

/// POST /payments/:id/refresh
pub async fn refresh_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let intent = state
        .refresh_payment
        .handle(RefreshPaymentStatusCommand {
            payment_id: PaymentId::from_uuid(id),
            requester_id: user.user_id,
        })
        .await?;
    Ok(Json(PaymentResponse::from(&intent)))
}
