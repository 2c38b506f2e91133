//! HTTP handlers for share endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::sharing::{
    BrowseShareQuery, DeactivateShareCommand, ListPublicSharesQuery, ListUserSharesQuery,
    PublishShareCommand, ShareLocator, UpdateFieldVisibilityCommand,
};
use crate::domain::foundation::{ContactId, DomainError, ShareId, UserId};
use crate::domain::sharing::{parse_field_set, AccessToken, FieldSet};

use super::super::dto::parse_price;
use super::super::error::ApiError;
use super::super::middleware::AuthenticatedUser;
use super::super::state::AppState;
use super::dto::{
    BrowseShareResponse, CatalogueParams, OwnerShareResponse, PublishShareRequest,
    PublishShareResponse, ShareCard, UpdateFieldsRequest,
};

fn field_sets(
    visible: Option<Vec<String>>,
    hidden: Vec<String>,
) -> Result<(Option<FieldSet>, FieldSet), DomainError> {
    let visible = visible.map(|names| parse_field_set(&names)).transpose()?;
    Ok((visible, parse_field_set(&hidden)?))
}

/// POST /shares - publish a contact
pub async fn publish_share(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PublishShareRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (visible_fields, hidden_fields) = field_sets(request.visible_fields, request.hidden_fields)?;
    let price = parse_price(request.price.as_deref(), request.currency.as_deref())?;

    let cmd = PublishShareCommand {
        owner_id: user.user_id,
        contact_id: ContactId::from_uuid(request.contact_id),
        visibility: request.visibility,
        allowed_viewers: request.allowed_viewers.into_iter().map(UserId::from_uuid).collect(),
        visible_fields,
        hidden_fields,
        price,
        description: request.description,
    };
    let result = state.publish_share.handle(cmd).await?;

    let status = if result.created { StatusCode::CREATED } else { StatusCode::OK };
    let response = PublishShareResponse {
        share: OwnerShareResponse::new(&result.share, &state.bot_username),
        created: result.created,
    };
    Ok((status, Json(response)))
}

/// GET /shares - public catalogue
pub async fn list_public_shares(
    State(state): State<AppState>,
    Query(params): Query<CatalogueParams>,
) -> Result<impl IntoResponse, ApiError> {
    let shares = state
        .list_public_shares
        .handle(ListPublicSharesQuery {
            limit: params.limit,
            offset: params.offset,
        })
        .await?;

    let cards: Vec<ShareCard> = shares
        .iter()
        .map(|share| ShareCard::new(share, &state.bot_username))
        .collect();
    Ok(Json(cards))
}

/// GET /shares/mine - the caller's active shares
pub async fn list_my_shares(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let shares = state
        .list_user_shares
        .handle(ListUserSharesQuery { owner_id: user.user_id })
        .await?;

    let response: Vec<OwnerShareResponse> = shares
        .iter()
        .map(|share| OwnerShareResponse::new(share, &state.bot_username))
        .collect();
    Ok(Json(response))
}

async fn browse(
    state: &AppState,
    user: AuthenticatedUser,
    locator: ShareLocator,
) -> Result<BrowseShareResponse, ApiError> {
    let result = state
        .browse_share
        .handle(BrowseShareQuery {
            locator,
            viewer_id: user.user_id,
        })
        .await?;
    Ok(BrowseShareResponse::from(result))
}

/// GET /shares/by-token/:token - open a deep link
pub async fn browse_by_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = AccessToken::parse(token).map_err(DomainError::from)?;
    Ok(Json(browse(&state, user, ShareLocator::Token(token)).await?))
}

/// GET /shares/:id - browse by id
pub async fn browse_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let locator = ShareLocator::Id(ShareId::from_uuid(id));
    Ok(Json(browse(&state, user, locator).await?))
}

/// PATCH /shares/:id/fields - change which fields the share exposes
pub async fn update_fields(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFieldsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (visible_fields, hidden_fields) = field_sets(request.visible_fields, request.hidden_fields)?;
    let share = state
        .update_fields
        .handle(UpdateFieldVisibilityCommand {
            share_id: ShareId::from_uuid(id),
            owner_id: user.user_id,
            visible_fields,
            hidden_fields,
        })
        .await?;
    Ok(Json(OwnerShareResponse::new(&share, &state.bot_username)))
}

/// DELETE /shares/:id - withdraw a share
pub async fn deactivate_share(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .deactivate_share
        .handle(DeactivateShareCommand {
            share_id: ShareId::from_uuid(id),
            owner_id: user.user_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
