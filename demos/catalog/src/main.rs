//! Catalog demo: seeds a product catalog through rowmap repositories and
//! prints what it finds as JSON.
//!
//! Reads `rowmap.database.*` from `application.yaml` (or `ROWMAP_DATABASE_URL`)
//! and falls back to an in-memory database.

mod models;

use std::error::Error;

use models::{Price, Product, ProductView, Stock};
use rowmap::prelude::*;
use rowmap::ConfigError;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS CODIGO (
        NOMETABELA TEXT NOT NULL,
        NOMECAMPO TEXT NOT NULL,
        ULTIMOCODIGO TEXT NOT NULL,
        PRIMARY KEY (NOMETABELA, NOMECAMPO))",
    "CREATE TABLE IF NOT EXISTS PRODUTO (
        CODPROD TEXT PRIMARY KEY,
        CODIGO TEXT,
        NOMEPROD TEXT NOT NULL,
        UNIDADE TEXT NOT NULL,
        DESCMAXIMO INTEGER NOT NULL DEFAULT 0,
        FLAGINATIVO TEXT NOT NULL DEFAULT 'N',
        FLAGNAOVENDER TEXT NOT NULL DEFAULT 'N',
        FLAGCONTROLAESTOQUE TEXT NOT NULL DEFAULT 'Y')",
    "CREATE TABLE IF NOT EXISTS PRODUTOESTOQUE (
        CODPROD TEXT NOT NULL,
        CODEMPRESA INTEGER NOT NULL,
        CODSETORESTOQUE TEXT,
        ESTATU REAL NOT NULL DEFAULT 0,
        LAST_CHANGE TEXT,
        PRIMARY KEY (CODPROD, CODEMPRESA))",
    "CREATE TABLE IF NOT EXISTS PRODUTOPRECO (
        CODPRODUTOPRECO TEXT PRIMARY KEY,
        CODPROD TEXT NOT NULL,
        CODPRECO TEXT NOT NULL,
        PRECO REAL NOT NULL)",
];

const DEFAULT_PRICE_LIST: &str = "000000001";
const COMPANY: i64 = 1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = RowmapConfig::load("dev")?;
    let database = match config.section::<DatabaseConfig>() {
        Ok(database) => database,
        Err(ConfigError::NotFound(key)) => {
            tracing::info!(%key, "no database configured, using an in-memory database");
            DatabaseConfig::new("sqlite::memory:")
        }
        Err(e) => return Err(e.into()),
    };

    let mut conn = SqlxConnection::from_config(&database).await?;
    prepare(&mut conn).await?;

    for (name, unit, price, quantity) in [
        ("Red sports car", "un", 89_000.0, 2.0),
        ("Blue car", "un", 42_500.0, 5.0),
        ("Red bike", "un", 780.0, 12.0),
    ] {
        register(&mut conn, Product::new(name, unit), price, quantity).await?;
    }
    conn.commit().await?;

    // a stock count arrives for the first product
    let mut stocks = Repository::<Stock, _>::new(&mut conn);
    let counted = stocks
        .find_one_by_columns(&[("CODPROD", "000001".into()), ("CODEMPRESA", COMPANY.into())])
        .await?;
    if let Some(mut stock) = counted {
        stock.quantity -= 1.0;
        stocks.update(&mut stock).await?;
        stocks.commit().await?;
    }

    let matches = Repository::<Product, _>::new(&mut conn)
        .find_by_columns(Pageable::unpaged(), false, &[("NOMEPROD", "Red car".into())])
        .await?
        .unwrap_or_default();
    for product in matches {
        let view = describe(&mut conn, product).await?;
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    let first_page = Repository::<Product, _>::new(&mut conn)
        .page(Pageable::new(1, 2))
        .await?;
    println!("{}", serde_json::to_string_pretty(&first_page)?);

    let mut conn = restock_concurrently(conn).await?;

    let names = conn
        .query_columnar("SELECT CODPROD, NOMEPROD FROM PRODUTO ORDER BY CODPROD", &[])
        .await?;
    println!("{}", serde_json::to_string_pretty(&names)?);

    conn.close().await?;
    Ok(())
}

/// Create the tables and seed the key counters the entities rely on.
async fn prepare(conn: &mut SqlxConnection) -> Result<(), DataError> {
    for ddl in SCHEMA {
        conn.execute(ddl, &[]).await?;
    }
    for (table, column) in [("PRODUTO", "CODPROD"), ("PRODUTOPRECO", "CODPRODUTOPRECO")] {
        let mut counters = Repository::<CounterRow, _>::new(&mut *conn);
        let existing = counters
            .find_one_by_columns(&[("NOMETABELA", table.into()), ("NOMECAMPO", column.into())])
            .await?;
        if existing.is_none() {
            counters.insert(&mut CounterRow::new(table, column, "1")).await?;
        }
    }
    conn.commit().await
}

/// Insert a product with its default price and opening stock. Not committed.
async fn register(
    conn: &mut SqlxConnection,
    mut product: Product,
    price: f64,
    quantity: f64,
) -> Result<Product, DataError> {
    Repository::<Product, _>::new(&mut *conn).insert(&mut product).await?;
    let code = product
        .code
        .clone()
        .ok_or_else(|| DataError::Other("PRODUTO counter is missing".into()))?;

    Repository::<Price, _>::new(&mut *conn)
        .insert(&mut Price {
            id: None,
            product: code.clone(),
            price_list: DEFAULT_PRICE_LIST.into(),
            price,
        })
        .await?;
    Repository::<Stock, _>::new(&mut *conn)
        .insert(&mut Stock {
            product: code,
            company: COMPANY,
            sector: None,
            quantity,
            last_change: None,
        })
        .await?;
    tracing::info!(code = ?product.code, name = %product.name, "product registered");
    Ok(product)
}

async fn describe(conn: &mut SqlxConnection, product: Product) -> Result<ProductView, DataError> {
    let code: Value = product.code.clone().into();
    let price = Repository::<Price, _>::new(&mut *conn)
        .find_one_by_columns(&[("CODPROD", code.clone()), ("CODPRECO", DEFAULT_PRICE_LIST.into())])
        .await?
        .map(|p| p.price);
    let stock = Repository::<Stock, _>::new(&mut *conn)
        .find_one_by_columns(&[("CODPROD", code), ("CODEMPRESA", COMPANY.into())])
        .await?;
    Ok(ProductView {
        product,
        price,
        stock,
    })
}

/// Several tasks register products on one shared connection.
async fn restock_concurrently(conn: SqlxConnection) -> Result<SqlxConnection, Box<dyn Error>> {
    let shared = conn.into_shared();
    let mut handles = Vec::new();
    for i in 1..=4 {
        let shared = shared.clone();
        handles.push(tokio::spawn(async move {
            let mut conn = shared.lock().await;
            let product = register(&mut conn, Product::new(&format!("Spare part {i}"), "pc"), 9.9, 100.0).await?;
            conn.commit().await?;
            Ok::<_, DataError>(product)
        }));
    }
    for handle in handles {
        handle.await??;
    }
    shared
        .try_into_inner()
        .map_err(|_| "connection still shared".into())
}
