//! MongoDB document models and their JSON response views.
//!
//! Each collection gets a document struct (what the driver reads/writes)
//! and a `*View` struct (what route handlers return). Documents keep BSON
//! types (`ObjectId`, BSON datetimes); views flatten those to hex strings
//! and RFC 3339 timestamps so the static frontend sees plain JSON.

pub mod message;
pub mod order;
pub mod product;
pub mod review;
pub mod setting;

pub use message::{MessageDoc, MessageView};
pub use order::{OrderDoc, OrderItem, OrderView, PaymentInfo, ShippingAddress};
pub use product::{ExtendedDetails, ProductDoc, ProductView};
pub use review::{ReviewDoc, ReviewView};
pub use setting::{SettingDoc, SettingView};
