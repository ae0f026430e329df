use axum::{Json, extract::{Path, State}};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    error::ApiError, extractors::auth::AuthUser, routes::notification::deliver,
    state::AppState, ws::dispatcher,
};
use crate::routes::party::{PartyResponse, fan_out_completed, parse_party_id, to_response};
use shopsquad_db::models::{NotificationKind, Party, PartyStatus};
use shopsquad_services::dao::party::PartyDao;
use shopsquad_services::shares::{self, ParticipantShare};

#[derive(Debug, Serialize)]
pub struct SharesResponse {
    pub shares: Vec<ParticipantShare>,
    pub grand_total: f64,
    pub total_amount: Option<f64>,
}

pub async fn shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
) -> Result<Json<SharesResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;

    Ok(Json(SharesResponse {
        shares: shares::compute_shares(&party.products, &party.participants),
        grand_total: shares::grand_total(&party.products),
        total_amount: party.total_amount,
    }))
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub approval_url: Option<String>,
    pub amount: f64,
}

fn payable_share(party: &Party, auth: &AuthUser) -> Result<f64, ApiError> {
    if party.status != PartyStatus::InPayment {
        return Err(ApiError::Validation(
            "The squad is not collecting payments".to_string(),
        ));
    }
    if party.payment_of(&auth.user_id).is_some() {
        return Err(ApiError::Validation(
            "You have already paid your share".to_string(),
        ));
    }
    let amount = shares::share_of(&party.products, &auth.user_id);
    if amount <= 0.0 {
        return Err(ApiError::Validation(
            "You have nothing to pay in this squad".to_string(),
        ));
    }
    Ok(amount)
}

pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;
    let amount = payable_share(&party, &auth)?;

    let order = state
        .paypal
        .create_order(amount, &format!("Your share for {}", party.title))
        .await?;

    Ok(Json(OrderResponse {
        order_id: order.order_id,
        approval_url: order.approval_url,
        amount,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub order_id: Option<String>,
}

/// Captures the approved order (when PayPal is configured) and records the
/// payment inside the party. Capture happens first: if the local write then
/// fails, the provider already has the money, so the order id is logged and
/// surfaced as a manual-reconciliation reference instead of pretending the
/// payment never happened.
pub async fn capture(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<CaptureRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let party = state.parties.get_for_participant(pid, &auth.user_id).await?;
    let amount = payable_share(&party, &auth)?;

    let provider_order_id = if state.paypal.is_configured() {
        let order_id = body.order_id.ok_or_else(|| {
            ApiError::BadRequest("order_id is required to capture a payment".to_string())
        })?;
        let captured = state.paypal.capture_order(&order_id).await?;
        Some(captured.order_id)
    } else {
        // Nothing was captured, so there is no provider reference to keep;
        // a client-supplied id would be an unverified string.
        None
    };

    let party = match state
        .parties
        .record_payment(pid, &user, amount, provider_order_id.clone())
        .await
    {
        Ok(party) => party,
        Err(e) => {
            if let Some(ref order_id) = provider_order_id {
                error!(
                    %order_id, party_id = %pid, user_id = %auth.user_id, %e,
                    "Payment captured but not recorded; reconcile manually"
                );
                return Err(ApiError::Internal(format!(
                    "Payment was captured but could not be recorded; \
                     quote order {order_id} to support"
                )));
            }
            return Err(e.into());
        }
    };

    // Receipt to the payer, heads-up to the organizer.
    notify_payment_recorded(
        &state,
        &party,
        auth.user_id,
        &user.display_name,
        &user.email,
        amount,
    )
    .await;

    let party = if state.settings.party.auto_complete
        && party.status == PartyStatus::InPayment
        && PartyDao::all_paid(&party)
    {
        let party = state.parties.auto_complete(pid).await?;
        fan_out_completed(&state, &party).await;
        party
    } else {
        party
    };

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

async fn notify_payment_recorded(
    state: &AppState,
    party: &Party,
    payer_id: bson::oid::ObjectId,
    payer_name: &str,
    payer_email: &str,
    amount: f64,
) {
    if payer_id != party.organizer_id {
        deliver(
            state,
            party.organizer_id,
            NotificationKind::PaymentReceived,
            format!("{payer_name} paid their share"),
            format!("{payer_name} paid {amount:.2} for {}", party.title),
            party.id,
            Some(payer_id),
            Some(payer_name.to_string()),
        )
        .await;

        if let Some(organizer) = party.participants.iter().find(|p| p.id == party.organizer_id) {
            let email = state.email.clone();
            let (to_email, to_name) = (organizer.email.clone(), organizer.name.clone());
            let (title, payer) = (party.title.clone(), payer_name.to_string());
            tokio::spawn(async move {
                if let Err(e) = email
                    .send_payment_notification(&to_email, &to_name, &title, &payer, amount)
                    .await
                {
                    warn!(%e, "Failed to send payment-notification email");
                }
            });
        }
    }

    let email = state.email.clone();
    let (to_email, to_name) = (payer_email.to_string(), payer_name.to_string());
    let title = party.title.clone();
    tokio::spawn(async move {
        if let Err(e) = email
            .send_payment_confirmation(&to_email, &to_name, &title, amount)
            .await
        {
            warn!(%e, "Failed to send payment-confirmation email");
        }
    });
}
