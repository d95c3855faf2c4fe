//! Order notification email sent to the shop owner over SMTP.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::OrderDoc;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Sends transactional mail for the shop.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    owner_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            owner_address: config.owner_address.clone(),
        })
    }

    /// Notify the shop owner that an order was placed and paid.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_order_notification(&self, order: &OrderDoc) -> Result<(), EmailError> {
        let subject = format!("New order from {}", order.shipping_address.name);
        let body = order_notification_body(order);

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(self
                .owner_address
                .parse()
                .map_err(|_| EmailError::InvalidAddress(self.owner_address.clone()))?)
            .subject(&subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(email).await?;

        tracing::info!(to = %self.owner_address, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Plain-text body for the owner's order notification.
fn order_notification_body(order: &OrderDoc) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "A new order was placed by {} <{}>.\n\n",
        order.shipping_address.name, order.customer_email
    ));
    body.push_str("Items:\n");
    for item in &order.items {
        body.push_str(&format!(
            "  {} x{} at ${:.2}\n",
            item.name, item.quantity, item.price
        ));
    }
    body.push_str(&format!("\nTotal: ${:.2}\n", order.total));
    body.push_str(&format!(
        "\nShip to:\n  {}\n  {}\n",
        order.shipping_address.name, order.shipping_address.line1
    ));
    if let Some(line2) = &order.shipping_address.line2 {
        body.push_str(&format!("  {line2}\n"));
    }
    body.push_str(&format!(
        "  {}, {} {}\n",
        order.shipping_address.city, order.shipping_address.state, order.shipping_address.postal_code
    ));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderItem, PaymentInfo, ShippingAddress};
    use chrono::Utc;
    use foxglove_core::{OrderStatus, PaymentMethod, PaymentStatus};
    use mongodb::bson::oid::ObjectId;

    fn sample_order() -> OrderDoc {
        OrderDoc {
            id: None,
            customer_email: "june@example.com".to_string(),
            items: vec![OrderItem {
                product_id: ObjectId::new(),
                name: "Dried Lavender Bundle".to_string(),
                price: 14.5,
                quantity: 2,
            }],
            total: 29.0,
            shipping_address: ShippingAddress {
                name: "June Carter".to_string(),
                line1: "12 Orchard Ln".to_string(),
                line2: Some("Unit B".to_string()),
                city: "Maplewood".to_string(),
                state: "VT".to_string(),
                postal_code: "05401".to_string(),
            },
            payment: PaymentInfo {
                method: PaymentMethod::Square,
                status: PaymentStatus::Completed,
                transaction_id: "txn_123".to_string(),
            },
            status: OrderStatus::Paid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_notification_body_lists_items_and_total() {
        let body = order_notification_body(&sample_order());
        assert!(body.contains("June Carter <june@example.com>"));
        assert!(body.contains("Dried Lavender Bundle x2 at $14.50"));
        assert!(body.contains("Total: $29.00"));
        assert!(body.contains("Unit B"));
        assert!(body.contains("Maplewood, VT 05401"));
    }
}
