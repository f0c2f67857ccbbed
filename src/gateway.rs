use rocket::http::Status;

use crate::resp::problem::Problem;

static PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

/// Thin client for the Stripe payment-intent endpoint. The secret key comes
/// from configuration; intents are confirmed client-side with the returned
/// client secret.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    secret_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Stripe amounts are integral minor units (cents).
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

impl StripeGateway {
    pub fn new(secret_key: String) -> StripeGateway {
        StripeGateway {
            secret_key,
            http: reqwest::Client::new(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, Problem> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .http
            .post(PAYMENT_INTENTS_URL)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!("payment gateway returned {}", response.status());
            return Err(Problem::new_untyped(
                Status::InternalServerError,
                "Payment gateway rejected the request.",
            ));
        }

        let intent = response.json::<PaymentIntent>().await?;
        tracing::info!("created payment intent {}", intent.id);

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_convert_to_integral_cents() {
        assert_eq!(to_cents(12.5), 1250);
        assert_eq!(to_cents(0.0), 0);
        // Float representation of 19.99 must not truncate down to 1998.
        assert_eq!(to_cents(19.99), 1999);
    }

    #[test]
    fn intent_response_parses_required_fields() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{ "id": "pi_123", "client_secret": "pi_123_secret_abc", "status": "requires_payment_method" }"#,
        )
        .expect("gateway response should parse");
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
    }
}
