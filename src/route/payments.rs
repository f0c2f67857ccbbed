use bson::oid::ObjectId;
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::data::payment::{Payment, PaymentDbExt};
use crate::gateway::{to_cents, StripeGateway};
use crate::resp::jwt::AuthClaims;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(rename = "bookingId")]
    pub booking_id: String,
    pub email: String,
    pub amount: f64,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
}

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Records a completed payment: marks the booking paid, then appends the
/// payment log entry. The two writes are sequential and non-atomic.
#[post("/payments", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(db))]
pub async fn payment_confirm(
    body: Json<PaymentConfirmation>,
    _auth: AuthClaims,
    db: &State<Database>,
) -> Result<(Status, Json<Value>), Problem> {
    let body = body.into_inner();
    if body.transaction_id.trim().is_empty() {
        return Err(problems::bad_input("transactionId is required."));
    }
    let booking_id = ObjectId::parse_str(&body.booking_id)
        .map_err(|_| problems::bad_object_id(&body.booking_id))?;

    let payment = Payment {
        id: None,
        booking_id,
        email: body.email,
        amount: body.amount,
        transaction_id: body.transaction_id,
        paid_at: None,
    };

    let id = db.confirm_payment(payment).await?;

    Ok((Status::Created, Json(json!({ "insertedId": id.to_hex() }))))
}

#[post("/create-payment-intent", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(gateway))]
pub async fn create_payment_intent(
    body: Json<IntentRequest>,
    _auth: AuthClaims,
    gateway: &State<StripeGateway>,
) -> Result<Json<Value>, Problem> {
    if body.amount <= 0.0 {
        return Err(problems::bad_input("Amount must be positive."));
    }

    let currency = body.currency.as_deref().unwrap_or("usd");
    let intent = gateway
        .create_payment_intent(to_cents(body.amount), currency)
        .await?;

    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}
