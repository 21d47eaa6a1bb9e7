//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::Record;
use crate::query::ItemQuery;
use crate::store::StoreState;

/// Query string of `GET /api/items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

impl From<ItemsParams> for ItemQuery {
    fn from(params: ItemsParams) -> Self {
        ItemQuery {
            search: params.q,
            category: params.category,
            supplier: params.supplier,
        }
    }
}

/// Response of `GET /api/items`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
    pub items: Vec<Record>,
    pub total: usize,
    pub state: StoreState,
}

/// Response of the distinct-value endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ValuesResponse {
    pub values: Vec<String>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
        "items": [],
    })
}
