//! Product catalog entities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    MaterialBruto,
    ParteProduto,
    ProdutoPronto,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::MaterialBruto => "material_bruto",
            ProductType::ParteProduto => "parte_produto",
            ProductType::ProdutoPronto => "produto_pronto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "material_bruto" => Some(ProductType::MaterialBruto),
            "parte_produto" => Some(ProductType::ParteProduto),
            "produto_pronto" => Some(ProductType::ProdutoPronto),
            _ => None,
        }
    }
}

/// One line item of a product's bill of materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    pub total_cost: f64,
}

/// Catalog entity. `sale_price` and `supplier` are absent (not zero, not
/// empty) when unset, and stay out of the serialized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub cost_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}
