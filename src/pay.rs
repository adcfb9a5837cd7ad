use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::PaymentError;
use crate::model::{
    PayPayload, PaymentCreated, PaymentInstrument, PaymentRequest, DEFAULT_CUSTOMER_NAME,
    REDIRECT_MODE_POST,
};
use crate::transaction::ValidatedPayment;
use crate::SharedState;

/// CORS preflight. The headers come from the router-wide layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

pub async fn initiate(State(state): State<SharedState>, body: Bytes) -> Response {
    match create_payment(&state, &body).await {
        Ok(created) => (StatusCode::OK, Json(created)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_payment(
    state: &SharedState,
    body: &[u8],
) -> Result<PaymentCreated, PaymentError> {
    // 0. Read the booking form, an empty or unreadable body counts as `{}`

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        PaymentRequest::default()
    } else {
        serde_json::from_slice::<PaymentRequest>(body).unwrap_or_else(|e| {
            info!("Ignoring unreadable request body: {}", e);
            PaymentRequest::default()
        })
    };
    let payment = ValidatedPayment::try_from(request)?;

    // 1. Build the pay payload

    let merchant_transaction_id = state.transaction_ids.next_id();
    let config = &state.config;
    let mut redirect_url = config.status_page_url.clone();
    redirect_url
        .query_pairs_mut()
        .append_pair("txn", &merchant_transaction_id);
    let payload = PayPayload {
        merchant_id: state.gateway.merchant_id().to_string(),
        merchant_transaction_id: merchant_transaction_id.clone(),
        merchant_user_id: payment.phone.clone(),
        name: payment
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.into()),
        amount: payment.amount_in_paise,
        redirect_url: redirect_url.into(),
        redirect_mode: REDIRECT_MODE_POST.into(),
        callback_url: config.callback_url.clone(),
        mobile_number: payment.phone,
        email: payment.email,
        payment_instrument: PaymentInstrument::pay_page(),
    };
    info!(
        "Creating payment {} for {} paise",
        merchant_transaction_id, payload.amount
    );

    // 2. Sign and send to PhonePe

    let payment_url = state.gateway.create_payment(&payload).await?;
    info!("Payment {} created", merchant_transaction_id);

    Ok(PaymentCreated {
        ok: true,
        payment_url,
        merchant_transaction_id,
    })
}
