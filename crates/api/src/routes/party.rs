use axum::{Json, extract::{Path, State}, http::StatusCode};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::ApiError, extractors::auth::AuthUser, routes::notification::deliver,
    state::AppState, ws::dispatcher,
};
use shopsquad_db::models::{
    ChatMessage, NotificationKind, Participant, Party, PartyStatus, Payment, Product,
};
use shopsquad_services::shares;

// ---- DTOs ----------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub id: String,
    pub title: String,
    pub date: String,
    pub location: Option<String>,
    pub organizer_id: String,
    pub organizer_name: String,
    pub participants: Vec<ParticipantResponse>,
    pub products: Vec<ProductResponse>,
    pub payments: Vec<PaymentResponse>,
    pub messages: Vec<MessageResponse>,
    pub status: PartyStatus,
    pub applied_coupon: Option<String>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub selected_variant: Option<shopsquad_db::models::SelectedVariant>,
    pub added_by: String,
    pub added_by_name: String,
    pub added_at: String,
    pub status: Option<shopsquad_db::models::ProductStatus>,
    pub reactions: Vec<ReactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub user_id: String,
    pub user_name: String,
    pub reaction: shopsquad_db::models::ReactionKind,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub user_id: String,
    pub user_name: String,
    pub amount: f64,
    pub provider_order_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub created_at: String,
}

fn fmt_dt(dt: bson::DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

fn participant_response(p: &Participant) -> ParticipantResponse {
    ParticipantResponse {
        id: p.id.to_hex(),
        name: p.name.clone(),
        email: p.email.clone(),
        avatar: p.avatar.clone(),
    }
}

fn product_response(p: &Product) -> ProductResponse {
    ProductResponse {
        id: p.id.clone(),
        title: p.title.clone(),
        price: p.price,
        original_price: p.original_price,
        images: p.images.clone(),
        description: p.description.clone(),
        vendor: p.vendor.clone(),
        product_type: p.product_type.clone(),
        selected_variant: p.selected_variant.clone(),
        added_by: p.added_by.to_hex(),
        added_by_name: p.added_by_name.clone(),
        added_at: fmt_dt(p.added_at),
        status: p.status,
        reactions: p
            .reactions
            .iter()
            .map(|r| ReactionResponse {
                user_id: r.user_id.to_hex(),
                user_name: r.user_name.clone(),
                reaction: r.reaction,
            })
            .collect(),
    }
}

fn payment_response(p: &Payment) -> PaymentResponse {
    PaymentResponse {
        user_id: p.user_id.to_hex(),
        user_name: p.user_name.clone(),
        amount: p.amount,
        provider_order_id: p.provider_order_id.clone(),
        created_at: fmt_dt(p.created_at),
    }
}

pub fn message_response(m: &ChatMessage) -> MessageResponse {
    MessageResponse {
        id: m.id.clone(),
        text: m.text.clone(),
        sender_id: m.sender_id.to_hex(),
        sender_name: m.sender_name.clone(),
        sender_avatar: m.sender_avatar.clone(),
        created_at: fmt_dt(m.created_at),
    }
}

pub fn to_response(party: &Party) -> PartyResponse {
    PartyResponse {
        id: party.id.map(|id| id.to_hex()).unwrap_or_default(),
        title: party.title.clone(),
        date: fmt_dt(party.date),
        location: party.location.clone(),
        organizer_id: party.organizer_id.to_hex(),
        organizer_name: party.organizer_name.clone(),
        participants: party.participants.iter().map(participant_response).collect(),
        products: party.products.iter().map(product_response).collect(),
        payments: party.payments.iter().map(payment_response).collect(),
        messages: party.messages.iter().map(message_response).collect(),
        status: party.status,
        applied_coupon: party.applied_coupon.clone(),
        total_amount: party.total_amount,
    }
}

pub fn parse_party_id(party_id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(party_id)
        .map_err(|_| ApiError::BadRequest("Invalid party_id".to_string()))
}

// ---- Handlers ------------------------------------------------------------

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PartyResponse>>, ApiError> {
    let parties = state.parties.find_for_user(auth.user_id).await?;
    Ok(Json(parties.iter().map(to_response).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    pub title: String,
    pub date: String,
    pub location: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<PartyResponse>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    let date = chrono::DateTime::parse_from_rfc3339(&body.date)
        .map_err(|_| ApiError::BadRequest("Invalid date, expected RFC 3339".to_string()))?;

    let organizer = state.users.base.find_by_id(auth.user_id).await?;
    let party = state
        .parties
        .create(
            body.title,
            bson::DateTime::from_chrono(date.with_timezone(&chrono::Utc)),
            body.location,
            &organizer,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&party))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;
    Ok(Json(to_response(&party)))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let party = state.parties.join(pid, &user).await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// Invites are notifications, not membership: the invitee still joins
/// themselves.
pub async fn invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<InviteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;

    if party.organizer_paid() {
        return Err(ApiError::Forbidden(
            "The organizer has completed payment; invites are closed".to_string(),
        ));
    }

    let invitee = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|_| ApiError::NotFound("No user with that email".to_string()))?;
    let invitee_id = invitee
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;

    let inviter = state.users.base.find_by_id(auth.user_id).await?;
    deliver(
        &state,
        invitee_id,
        NotificationKind::Invite,
        format!("You're invited to {}", party.title),
        format!("{} invited you to join their shopping squad", inviter.display_name),
        party.id,
        Some(auth.user_id),
        Some(inviter.display_name),
    )
    .await;

    Ok(Json(serde_json::json!({ "invited": true })))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: PartyStatus,
}

pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state
        .parties
        .set_status(pid, &auth.user_id, body.status)
        .await?;

    // Each target state has exactly one inbound edge, so the target alone
    // identifies the transition.
    match body.status {
        PartyStatus::InPayment => fan_out_payment_requests(&state, &party).await,
        PartyStatus::InPreorder => {
            fan_out_to_others(
                &state,
                &party,
                NotificationKind::SquadClosed,
                format!("{} is ordering", party.title),
                "The cart is closed and the preorder is going in".to_string(),
            )
            .await
        }
        PartyStatus::Completed => fan_out_completed(&state, &party).await,
        PartyStatus::Upcoming => {
            fan_out_to_others(
                &state,
                &party,
                NotificationKind::SquadReopened,
                format!("{} was reopened", party.title),
                format!("{} reopened the squad", party.organizer_name),
            )
            .await
        }
        _ => {}
    }

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

/// A participant asking the organizer to reopen a completed squad. Only a
/// notification; the state does not move until the organizer acts.
pub async fn reopen_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;

    if party.organizer_id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Organizers reopen directly via the status endpoint".to_string(),
        ));
    }
    if party.status != PartyStatus::Completed {
        return Err(ApiError::Validation(
            "Only completed squads can be reopened".to_string(),
        ));
    }

    let requester = state.users.base.find_by_id(auth.user_id).await?;
    deliver(
        &state,
        party.organizer_id,
        NotificationKind::ReopenRequest,
        format!("Reopen request for {}", party.title),
        format!("{} asked to reopen the squad", requester.display_name),
        party.id,
        Some(auth.user_id),
        Some(requester.display_name),
    )
    .await;

    Ok(Json(serde_json::json!({ "requested": true })))
}

// ---- Fan-out helpers -----------------------------------------------------

async fn fan_out_payment_requests(state: &AppState, party: &Party) {
    for participant in &party.participants {
        if participant.id == party.organizer_id {
            continue;
        }
        let amount = shares::share_of(&party.products, &participant.id);
        deliver(
            state,
            participant.id,
            NotificationKind::PaymentRequest,
            format!("Payment requested for {}", party.title),
            format!("Your share is {amount:.2}"),
            party.id,
            Some(party.organizer_id),
            Some(party.organizer_name.clone()),
        )
        .await;

        let email = state.email.clone();
        let (to_email, to_name) = (participant.email.clone(), participant.name.clone());
        let (title, organizer) = (party.title.clone(), party.organizer_name.clone());
        tokio::spawn(async move {
            if let Err(e) = email
                .send_payment_request(&to_email, &to_name, &title, &organizer, amount)
                .await
            {
                warn!(%e, "Failed to send payment-request email");
            }
        });
    }
}

pub async fn fan_out_completed(state: &AppState, party: &Party) {
    let total = party.total_amount.unwrap_or_else(|| shares::grand_total(&party.products));
    for participant in &party.participants {
        if participant.id != party.organizer_id {
            deliver(
                state,
                participant.id,
                NotificationKind::SquadCompleted,
                format!("{} is complete", party.title),
                "All payments are in and the squad is wrapped up".to_string(),
                party.id,
                None,
                None,
            )
            .await;
        }

        let email = state.email.clone();
        let (to_email, to_name) = (participant.email.clone(), participant.name.clone());
        let title = party.title.clone();
        tokio::spawn(async move {
            if let Err(e) = email
                .send_party_complete(&to_email, &to_name, &title, total)
                .await
            {
                warn!(%e, "Failed to send party-complete email");
            }
        });
    }
}

async fn fan_out_to_others(
    state: &AppState,
    party: &Party,
    kind: NotificationKind,
    title: String,
    message: String,
) {
    for participant in &party.participants {
        if participant.id == party.organizer_id {
            continue;
        }
        deliver(
            state,
            participant.id,
            kind,
            title.clone(),
            message.clone(),
            party.id,
            None,
            None,
        )
        .await;
    }
}
