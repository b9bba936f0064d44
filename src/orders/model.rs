use serde::{Deserialize, Serialize};

/// Order as returned by the listing endpoint. Only the projected fields
/// are modelled; the rest of the object is ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OrderRecord {
    pub amazon_order_id: String,
    pub order_status: String,
    #[serde(default)]
    pub purchase_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default)]
    pub order_item_id: Option<String>,
    #[serde(default, rename = "ASIN")]
    pub asin: Option<String>,
    #[serde(rename = "SellerSKU", default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub quantity_ordered: u32,
    #[serde(default)]
    pub item_price: Option<Money>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    pub currency_code: String,
    pub amount: String,
}

/// `{"payload": {...}}` wrapper shared by both listing endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub payload: Option<T>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrdersPayload {
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OrderItemsPayload {
    #[serde(default)]
    pub order_items: Vec<LineItem>,
}
