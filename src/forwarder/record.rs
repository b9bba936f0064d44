use serde::Serialize;
use serde_json::{Map, Value};

use crate::orders::OrderRecord;

pub const ORDER_ID_FIELD: &str = "Order ID";
pub const STATUS_FIELD: &str = "Status";

/// Create-record body: `{"fields": {...}}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DestinationRecord {
    pub fields: Map<String, Value>,
}

impl DestinationRecord {
    /// Fixed projection: order id and status, nothing else.
    pub fn from_order(order: &OrderRecord) -> Self {
        let mut fields = Map::new();
        fields.insert(
            ORDER_ID_FIELD.to_owned(),
            Value::String(order.amazon_order_id.clone()),
        );
        fields.insert(
            STATUS_FIELD.to_owned(),
            Value::String(order.order_status.clone()),
        );
        Self { fields }
    }

    pub fn order_id(&self) -> Option<&str> {
        self.fields.get(ORDER_ID_FIELD).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projects_only_id_and_status() {
        let order = OrderRecord {
            amazon_order_id: "A1".to_owned(),
            order_status: "Pending".to_owned(),
            purchase_date: Some("2024-05-01T10:00:00Z".to_owned()),
        };
        let record = DestinationRecord::from_order(&order);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"fields": {"Order ID": "A1", "Status": "Pending"}})
        );
        assert_eq!(record.order_id(), Some("A1"));
    }
}
