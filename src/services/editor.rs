use thiserror::Error;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{Component, Product, ProductType};
use crate::utils::parse_decimal;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("component index {0} out of range")]
    ComponentIndex(usize),
    #[error("product type not selected")]
    MissingProductType,
    #[error("invalid number: {0:?}")]
    Number(String),
    #[error("product storage: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Staged edits for one product.
///
/// The editor holds an isolated draft; nothing reaches the catalog until
/// [`ProductEditor::commit`]. Both terminals, commit and discard, consume
/// the session, so there is no way back to editing.
#[derive(Debug, Clone)]
pub struct ProductEditor {
    existing_id: Option<String>,
    categories: Vec<String>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub product_type: Option<ProductType>,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub cost_price: f64,
    /// Raw form input; empty means "no sale price set".
    pub sale_price: String,
    pub supplier: String,
    components: Vec<Component>,
}

impl ProductEditor {
    /// Begin a session: a fresh copy of `existing` for edit mode, zero
    /// values for create mode. `categories` is the advisory category set
    /// the caller's UI offers.
    pub fn new(existing: Option<&Product>, categories: Vec<String>) -> Self {
        match existing {
            Some(product) => ProductEditor {
                existing_id: Some(product.id.clone()),
                categories,
                name: product.name.clone(),
                description: product.description.clone(),
                category: product.category.clone(),
                product_type: Some(product.product_type),
                unit: product.unit.clone(),
                current_stock: product.current_stock,
                min_stock: product.min_stock,
                cost_price: product.cost_price,
                sale_price: product
                    .sale_price
                    .map(|price| price.to_string())
                    .unwrap_or_default(),
                supplier: product.supplier.clone().unwrap_or_default(),
                components: product.components.clone(),
            },
            None => ProductEditor {
                existing_id: None,
                categories,
                name: String::new(),
                description: String::new(),
                category: String::new(),
                product_type: None,
                unit: String::new(),
                current_stock: 0.0,
                min_stock: 0.0,
                cost_price: 0.0,
                sale_price: String::new(),
                supplier: String::new(),
                components: Vec::new(),
            },
        }
    }

    pub fn is_edit(&self) -> bool {
        self.existing_id.is_some()
    }

    pub fn category_options(&self) -> &[String] {
        &self.categories
    }

    /// Advisory only: a category outside the set still commits as typed.
    pub fn category_is_known(&self) -> bool {
        self.categories.iter().any(|c| c == &self.category)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Append a blank line item; quantity starts at 1.
    pub fn add_component(&mut self) {
        self.components.push(Component {
            quantity: 1.0,
            ..Default::default()
        });
    }

    /// Replace one field of the line item at `index`. Numeric fields
    /// accept comma decimals; unknown field names are ignored.
    pub fn update_component_field(
        &mut self,
        index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        let component = self
            .components
            .get_mut(index)
            .ok_or(EditorError::ComponentIndex(index))?;
        match field {
            "product_name" => component.product_name = value.to_string(),
            "quantity" => component.quantity = parse_number(value)?,
            "unit" => component.unit = value.to_string(),
            "total_cost" => component.total_cost = parse_number(value)?,
            _ => {}
        }
        Ok(())
    }

    /// Remove the line item at `index`; the rest keep their order.
    pub fn remove_component(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= self.components.len() {
            return Err(EditorError::ComponentIndex(index));
        }
        self.components.remove(index);
        Ok(())
    }

    /// Finish the session: build the final record, reusing the id in
    /// edit mode and generating a fresh one otherwise, and hand it to
    /// the catalog's add-or-update.
    pub fn commit(self, db: &Database) -> Result<Product, EditorError> {
        let product_type = self.product_type.ok_or(EditorError::MissingProductType)?;
        let sale_price = if self.sale_price.trim().is_empty() {
            None
        } else {
            Some(parse_number(&self.sale_price)?)
        };
        let supplier = if self.supplier.is_empty() {
            None
        } else {
            Some(self.supplier)
        };

        let product = Product {
            id: self
                .existing_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name,
            description: self.description,
            category: self.category,
            product_type,
            unit: self.unit,
            current_stock: self.current_stock,
            min_stock: self.min_stock,
            cost_price: self.cost_price,
            sale_price,
            supplier,
            components: self.components,
        };
        db.upsert_product(&product)?;
        Ok(product)
    }

    /// Cancel the session, dropping the draft.
    pub fn discard(self) {}
}

fn parse_number(value: &str) -> Result<f64, EditorError> {
    parse_decimal(value).map_err(|_| EditorError::Number(value.to_string()))
}
