use serde::{Deserialize, Serialize};

use super::odata;

/// Plant view of the product master (`A_ProductPlant`, OData V2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPlant {
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Plant")]
    pub plant: String,
    #[serde(
        rename = "CountryOfOrigin",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub country_of_origin: Option<String>,
}
