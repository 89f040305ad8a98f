//! Subscription handlers.

use actix_web::{HttpResponse, web};

use newsroom_shared::ApiResponse;
use newsroom_shared::dto::{SubscribeForm, SubscribeFormInitial, SubscriptionResponse};

use super::redirect;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /subscribe/ - form pre-filled with the session user.
pub async fn subscribe_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let subscriptions = state
        .subscriptions
        .subscriptions_of(identity.user_id)
        .await?
        .into_iter()
        .map(|s| SubscriptionResponse {
            id: s.id,
            category_id: s.category_id,
            created_at: s.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SubscribeFormInitial {
        user: identity.user_id.to_string(),
        username: identity.username,
        subscriptions,
    })))
}

/// POST /subscribe/
pub async fn subscribe(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SubscribeForm>,
) -> AppResult<HttpResponse> {
    state
        .subscriptions
        .subscribe(identity.user_id, body.category)
        .await?;

    Ok(redirect("/"))
}
