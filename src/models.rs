use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ApiError;

/// Canonical order status. Stored as `Pending`/`Completed`, displayed as
/// `pending`/`completed`; the boundary also accepts the historical
/// `Complete` spelling. Both directions go through this one mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "completed" | "complete" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Canonical vocabulary persisted in the store.
    pub fn as_db(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
        }
    }

    /// Display vocabulary emitted on the read path.
    pub fn as_display(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_display())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub order_id: String,
    pub customer_name: String,
    pub product: String,
    pub quantity: i32,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated order ready to insert; `id` and timestamps are generated by
/// the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_name: String,
    pub product: String,
    pub quantity: i32,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
}

/// Full replacement of the mutable fields of an existing order.
#[derive(Debug, Clone)]
pub struct OrderChanges {
    pub customer_name: String,
    pub product: String,
    pub quantity: i32,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
}

/// Raw request body for create and update. Everything is optional so that
/// validation can name each missing field instead of failing on the first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order_id: Option<String>,
    pub customer_name: Option<String>,
    pub product: Option<String>,
    pub quantity: Option<i32>,
    pub order_date: Option<String>,
    pub status: Option<String>,
}

impl OrderPayload {
    pub fn into_new_order(self) -> Result<NewOrder, ApiError> {
        let mut missing = Vec::new();
        let order_id = non_empty("orderId", self.order_id, &mut missing);
        let customer_name = non_empty("customerName", self.customer_name, &mut missing);
        let product = non_empty("product", self.product, &mut missing);
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        if self.order_date.is_none() {
            missing.push("orderDate");
        }
        if !missing.is_empty() {
            return Err(missing_fields(missing));
        }

        Ok(NewOrder {
            order_id: order_id.unwrap_or_default(),
            customer_name: customer_name.unwrap_or_default(),
            product: product.unwrap_or_default(),
            quantity: valid_quantity(self.quantity)?,
            order_date: valid_date(self.order_date)?,
            status: valid_status(self.status)?.unwrap_or(OrderStatus::Pending),
        })
    }

    pub fn into_changes(self) -> Result<OrderChanges, ApiError> {
        let mut missing = Vec::new();
        let customer_name = non_empty("customerName", self.customer_name, &mut missing);
        let product = non_empty("product", self.product, &mut missing);
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        if self.order_date.is_none() {
            missing.push("orderDate");
        }
        if self.status.is_none() {
            missing.push("status");
        }
        if !missing.is_empty() {
            return Err(missing_fields(missing));
        }

        Ok(OrderChanges {
            customer_name: customer_name.unwrap_or_default(),
            product: product.unwrap_or_default(),
            quantity: valid_quantity(self.quantity)?,
            order_date: valid_date(self.order_date)?,
            status: valid_status(self.status)?.unwrap_or(OrderStatus::Pending),
        })
    }
}

fn non_empty(
    field: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            missing.push(field);
            None
        }
    }
}

fn missing_fields(fields: Vec<&'static str>) -> ApiError {
    ApiError::Validation(format!("Missing required fields: {}", fields.join(", ")))
}

fn valid_quantity(quantity: Option<i32>) -> Result<i32, ApiError> {
    match quantity {
        Some(q) if q >= 1 => Ok(q),
        _ => Err(ApiError::Validation(
            "quantity must be at least 1".to_string(),
        )),
    }
}

fn valid_date(date: Option<String>) -> Result<NaiveDate, ApiError> {
    let text = date.unwrap_or_default();
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
        ApiError::Validation("orderDate must be a valid date (YYYY-MM-DD)".to_string())
    })
}

fn valid_status(status: Option<String>) -> Result<Option<OrderStatus>, ApiError> {
    match status {
        None => Ok(None),
        Some(text) => OrderStatus::parse(&text).map(Some).ok_or_else(|| {
            ApiError::Validation("status must be pending or completed".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> OrderPayload {
        OrderPayload {
            order_id: Some("ORD010".to_string()),
            customer_name: Some("Alice Baker".to_string()),
            product: Some("Croissant".to_string()),
            quantity: Some(3),
            order_date: Some("2025-02-01".to_string()),
            status: Some("completed".to_string()),
        }
    }

    #[test]
    fn status_parse_accepts_boundary_variants() {
        assert_eq!(OrderStatus::parse("pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("Pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("completed"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("Completed"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("Complete"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("COMPLETE"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn status_write_and_read_vocabularies_stay_consistent() {
        for input in ["completed", "Completed", "Complete"] {
            let status = OrderStatus::parse(input).unwrap();
            assert_eq!(status.as_db(), "Completed");
            assert_eq!(status.as_display(), "completed");
        }
        let status = OrderStatus::parse("PENDING").unwrap();
        assert_eq!(status.as_db(), "Pending");
        assert_eq!(status.as_display(), "pending");
    }

    #[test]
    fn new_order_from_full_payload() {
        let order = full_payload().into_new_order().unwrap();
        assert_eq!(order.order_id, "ORD010");
        assert_eq!(order.quantity, 3);
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn status_defaults_to_pending_on_create() {
        let mut payload = full_payload();
        payload.status = None;
        let order = payload.into_new_order().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn missing_fields_are_all_named() {
        let payload = OrderPayload {
            quantity: Some(1),
            order_date: Some("2025-02-01".to_string()),
            ..OrderPayload::default()
        };
        let err = payload.into_new_order().unwrap_err();
        match err {
            ApiError::Validation(message) => {
                assert!(message.contains("orderId"), "{}", message);
                assert!(message.contains("customerName"), "{}", message);
                assert!(message.contains("product"), "{}", message);
                assert!(!message.contains("quantity"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut payload = full_payload();
        payload.customer_name = Some("   ".to_string());
        let err = payload.into_new_order().unwrap_err();
        match err {
            ApiError::Validation(message) => assert!(message.contains("customerName")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut payload = full_payload();
        payload.quantity = Some(0);
        assert!(matches!(
            payload.into_new_order(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut payload = full_payload();
        payload.order_date = Some("01/02/2025".to_string());
        assert!(matches!(
            payload.into_new_order(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut payload = full_payload();
        payload.status = Some("shipped".to_string());
        assert!(matches!(
            payload.into_new_order(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn changes_require_status_but_not_order_id() {
        let mut payload = full_payload();
        payload.order_id = None;
        let changes = payload.into_changes().unwrap();
        assert_eq!(changes.status, OrderStatus::Completed);

        let mut payload = full_payload();
        payload.status = None;
        let err = payload.into_changes().unwrap_err();
        match err {
            ApiError::Validation(message) => assert!(message.contains("status")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn order_serializes_with_display_names() {
        let order = Order {
            id: 7,
            order_id: "ORD007".to_string(),
            customer_name: "Jane Smith".to_string(),
            product: "Bread".to_string(),
            quantity: 5,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["orderId"], "ORD007");
        assert_eq!(value["customerName"], "Jane Smith");
        assert_eq!(value["orderDate"], "2024-01-15");
        assert_eq!(value["status"], "completed");
    }
}
