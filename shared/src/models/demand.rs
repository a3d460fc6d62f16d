//! Demand metrics (market news)

use serde::{Deserialize, Serialize};

/// Per-crop demand metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandMetric {
    pub total_orders: u64,
    pub avg_price: f64,
}
