use bson::doc;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use mongodb::Database;
use rocket::http::Status;

use crate::data::session::{BookedSession, BOOKING_COLLECTION_NAME};
use crate::resp::problem::Problem;

pub static PAYMENT_COLLECTION_NAME: &str = "payments";

/// Append-only payment log entry, written after a booking is marked paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "bookingId")]
    pub booking_id: ObjectId,
    pub email: String,
    pub amount: f64,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

pub trait PaymentDbExt {
    /// Marks the booking paid, then appends the payment record.
    ///
    /// Two sequential writes, no transaction: a failure after the first write
    /// leaves a paid booking with no payment record. 404 when the booking
    /// doesn't exist.
    async fn confirm_payment(&self, payment: Payment) -> Result<ObjectId, Problem>;
}

impl PaymentDbExt for Database {
    async fn confirm_payment(&self, mut payment: Payment) -> Result<ObjectId, Problem> {
        let marked = self
            .collection::<BookedSession>(BOOKING_COLLECTION_NAME)
            .update_one(
                doc! { "_id": payment.booking_id },
                doc! { "$set": { "paid_status": true } },
                None,
            )
            .await?;

        if marked.matched_count == 0 {
            return Err(Problem::new_untyped(
                Status::NotFound,
                "Booking doesn't exist.",
            ));
        }

        payment.id = None;
        payment.paid_at = Some(Utc::now());

        let inserted = self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .insert_one(&payment, None)
            .await?;

        inserted.inserted_id.as_object_id().ok_or_else(|| {
            Problem::new_untyped(
                Status::InternalServerError,
                "Insert did not return an ObjectId.",
            )
        })
    }
}
