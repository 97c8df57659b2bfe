//! Catalog Storage
//! Mission: Persist and list catalog products

use crate::models::Product;
use anyhow::Result;
use rusqlite::{params, Connection};
use tracing::info;

/// Catalog storage with SQLite backend
pub struct CatalogStore {
    db_path: String,
}

impl CatalogStore {
    /// Create a new catalog store, initializing and seeding the database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema and seed sample products
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                price INTEGER NOT NULL,
                image TEXT NOT NULL
            )",
            [],
        )?;

        self.seed_if_empty(&conn)?;

        Ok(())
    }

    /// Seed the sample catalog on first startup. Idempotent across restarts.
    fn seed_if_empty(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let products = sample_products();
        for product in &products {
            conn.execute(
                "INSERT INTO products (id, name, price, image) VALUES (?1, ?2, ?3, ?4)",
                params![product.id, product.name, product.price, product.image],
            )?;
        }

        info!("🛒 Seeded catalog with {} sample products", products.len());

        Ok(())
    }

    /// List all products ordered by id
    pub fn list_products(&self) -> Result<Vec<Product>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare("SELECT id, name, price, image FROM products ORDER BY id")?;

        let products = stmt
            .query_map([], |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    image: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }
}

/// The sample dataset served until a real catalog is loaded
fn sample_products() -> Vec<Product> {
    vec![
        Product::new(
            1,
            "Áo thun nam",
            120_000,
            "https://th.bing.com/th/id/OIP._cFXyvl6CYFMo1QRizPoSgHaKs?rs=1&pid=ImgDetMain",
        ),
        Product::new(
            2,
            "Quần jeans nữ",
            350_000,
            "https://cf.shopee.vn/file/a7624da479e934e6776218d26135f4d0",
        ),
        Product::new(
            3,
            "Giày thể thao",
            600_000,
            "https://salt.tikicdn.com/ts/tmp/72/99/3d/6b8c1b6cc9094dc866dcbefab72fc9cc.jpg",
        ),
        Product::new(
            4,
            "Túi xách",
            450_000,
            "https://thuthuatnhanh.com/wp-content/uploads/2022/05/Mau-tui-xach-nu-dep-gia-re.jpg",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (CatalogStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = CatalogStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_seeded_on_creation() {
        let (store, _temp) = create_test_store();

        let products = store.list_products().unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].name, "Áo thun nam");
        assert_eq!(products[0].price, 120_000);
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();

        // Opening the same database twice must not duplicate rows.
        let _first = CatalogStore::new(db_path).unwrap();
        let second = CatalogStore::new(db_path).unwrap();

        let products = second.list_products().unwrap();
        assert_eq!(products.len(), 4);
    }

    #[test]
    fn test_products_ordered_by_id() {
        let (store, _temp) = create_test_store();

        let products = store.list_products().unwrap();
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
