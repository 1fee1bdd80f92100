use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::PathBuf;

use crate::models::{Component, Product, ProductType};
use crate::utils::now_rfc3339;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> SqlResult<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                product_type TEXT NOT NULL,
                unit TEXT NOT NULL,
                current_stock REAL NOT NULL,
                min_stock REAL NOT NULL,
                cost_price REAL NOT NULL,
                sale_price REAL,
                supplier TEXT,
                components TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
    }

    pub fn set_value(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, now_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> SqlResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        stmt.query_row(params![key], |row| row.get(0)).optional()
    }

    pub fn remove_value(&self, key: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn upsert_product(&self, product: &Product) -> SqlResult<()> {
        let components = serde_json::to_string(&product.components)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO products (
                id, name, description, category, product_type, unit,
                current_stock, min_stock, cost_price, sale_price, supplier,
                components, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                product.id,
                product.name,
                product.description,
                product.category,
                product.product_type.as_str(),
                product.unit,
                product.current_stock,
                product.min_stock,
                product.cost_price,
                product.sale_price,
                product.supplier,
                components,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_product(&self, id: &str) -> SqlResult<Option<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, category, product_type, unit,
                    current_stock, min_stock, cost_price, sale_price, supplier, components
             FROM products WHERE id = ?1",
        )?;
        stmt.query_row(params![id], row_to_product).optional()
    }

    pub fn list_products(&self) -> SqlResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, category, product_type, unit,
                    current_stock, min_stock, cost_price, sale_price, supplier, components
             FROM products
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], row_to_product)?;
        rows.collect()
    }

    pub fn delete_product(&self, id: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn row_to_product(row: &rusqlite::Row<'_>) -> SqlResult<Product> {
    let type_str: String = row.get(4)?;
    let product_type = ProductType::parse(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown product type '{type_str}'").into(),
        )
    })?;

    let components_json: String = row.get(11)?;
    let components: Vec<Component> = serde_json::from_str(&components_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        product_type,
        unit: row.get(5)?,
        current_stock: row.get(6)?,
        min_stock: row.get(7)?,
        cost_price: row.get(8)?,
        sale_price: row.get(9)?,
        supplier: row.get(10)?,
        components,
    })
}
