//! Square checkout route.
//!
//! The total is recomputed from database prices; client-supplied amounts
//! are never trusted. Stock is checked before charging, and decremented
//! with floored updates after the charge succeeds. The charge and the
//! decrements are not one transaction; a decrement failure after a
//! successful charge is logged at ERROR for manual reconciliation.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use foxglove_core::{Email, OrderStatus, PaymentMethod, PaymentStatus, Price, PriceError};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{OrderDoc, OrderItem, OrderView, PaymentInfo, ShippingAddress};
use crate::routes::products::parse_object_id;
use crate::square::SquareError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Card token from Square's Web Payments SDK.
    pub source_id: String,
    pub items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i64,
}

/// POST /api/payments/square
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn charge(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let Some(square) = state.square() else {
        return Err(AppError::ServiceUnavailable(
            "payments are not configured".to_string(),
        ));
    };

    let email = Email::parse(&request.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if request.source_id.trim().is_empty() {
        return Err(AppError::BadRequest("source_id is required".to_string()));
    }
    if request.items.is_empty() {
        return Err(AppError::BadRequest("order has no items".to_string()));
    }

    // Price the order from the database and check stock before charging.
    let products = ProductRepository::new(state.db());
    let mut order_items = Vec::with_capacity(request.items.len());
    for item in &request.items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        let id = parse_object_id(&item.product_id)?;
        let product = products
            .get(id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("unknown product {}", item.product_id)))?;
        if product.stock < item.quantity {
            return Err(AppError::BadRequest(format!(
                "not enough stock for \"{}\": {} requested, {} available",
                product.name, item.quantity, product.stock
            )));
        }
        order_items.push(OrderItem {
            product_id: id,
            name: product.name,
            price: product.price,
            quantity: item.quantity,
        });
    }

    let total = order_total(&order_items).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let amount_cents = total.cents();
    if amount_cents <= 0 {
        return Err(AppError::BadRequest("order total is zero".to_string()));
    }

    let payment = square.charge(&request.source_id, amount_cents).await?;
    let payment_status = match payment.status.as_str() {
        "COMPLETED" => PaymentStatus::Completed,
        "APPROVED" => PaymentStatus::Approved,
        other => {
            warn!(status = other, "unexpected Square payment status");
            return Err(AppError::Square(SquareError::Declined(format!(
                "payment ended in status {other}"
            ))));
        }
    };

    let mut order = OrderDoc {
        id: None,
        items: order_items,
        total: total.amount(),
        shipping_address: request.shipping_address,
        status: OrderStatus::Paid,
        payment: PaymentInfo {
            method: PaymentMethod::Square,
            status: payment_status,
            transaction_id: payment.id,
        },
        customer_email: email.normalized(),
        created_at: chrono::Utc::now(),
    };
    let order_id = OrderRepository::new(state.db()).create(&order).await?;
    order.id = Some(order_id);

    // Past this point the card is charged; failures are reconciliation
    // work, not request errors.
    for item in &order.items {
        match products.decrement_stock(item.product_id, item.quantity).await {
            Ok(true) => {}
            Ok(false) => {
                error!(
                    order_id = %order_id,
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    "stock decrement matched nothing after successful charge"
                );
            }
            Err(e) => {
                error!(
                    order_id = %order_id,
                    product_id = %item.product_id,
                    error = %e,
                    "stock decrement failed after successful charge"
                );
            }
        }
    }

    if let Some(email_service) = state.email() {
        if let Err(e) = email_service.send_order_notification(&order).await {
            warn!(order_id = %order_id, error = %e, "order notification email failed");
        }
    }

    info!(order_id = %order_id, total = total.amount(), "order placed");
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Sum the priced line items into a validated order total. [`Price::cents`]
/// then owns the dollars-to-cents rounding for the Square charge.
fn order_total(items: &[OrderItem]) -> std::result::Result<Price, PriceError> {
    let mut total = 0.0_f64;
    for item in items {
        #[allow(clippy::cast_precision_loss)]
        {
            total += item.price * item.quantity as f64;
        }
    }
    Price::parse(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn line(price: f64, quantity: i64) -> OrderItem {
        OrderItem {
            product_id: ObjectId::new(),
            name: "Lavender Sachet".to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_order_total_sums_line_items() {
        let total = order_total(&[line(19.99, 2), line(4.50, 1)]).unwrap();
        assert_eq!(total.cents(), 4448);
    }

    #[test]
    fn test_order_total_empty_is_zero() {
        assert_eq!(order_total(&[]).unwrap().cents(), 0);
    }
}
