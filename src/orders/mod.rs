pub mod fetch;
pub mod model;

pub use fetch::OrdersFetcher;
pub use model::{LineItem, Money, OrderRecord};
