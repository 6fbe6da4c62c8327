use chrono::{Local, NaiveDateTime};
use rowmap::prelude::*;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `Y`/`N` columns as booleans. Anything other than `Y` reads as false.
fn read_flag(row: &mut Row, column: &str) -> Result<bool, DataError> {
    match row.take::<Value>(column)? {
        Value::Bool(b) => Ok(b),
        Value::Text(s) => Ok(s == "Y"),
        _ => Ok(false),
    }
}

fn write_flag(flag: bool) -> Value {
    Value::from(if flag { "Y" } else { "N" })
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    #[serde(rename = "CODPROD")]
    pub code: Option<String>,
    #[serde(rename = "CODIGO")]
    pub barcode: Option<String>,
    #[serde(rename = "NOMEPROD")]
    pub name: String,
    #[serde(rename = "UNIDADE")]
    pub unit: String,
    #[serde(rename = "DESCMAXIMO")]
    pub max_discount: i64,
    #[serde(rename = "FLAGINATIVO")]
    pub inactive: bool,
    #[serde(rename = "FLAGNAOVENDER")]
    pub not_for_sale: bool,
    #[serde(rename = "FLAGCONTROLAESTOQUE")]
    pub tracks_stock: bool,
}

impl Product {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            code: None,
            barcode: None,
            name: name.to_string(),
            unit: unit.to_string(),
            max_discount: 0,
            inactive: false,
            not_for_sale: false,
            tracks_stock: true,
        }
    }
}

impl Entity for Product {
    fn table_name() -> &'static str {
        "PRODUTO"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPROD").primary_key().counter(6),
            Column::new("CODIGO"),
            Column::new("NOMEPROD"),
            Column::new("UNIDADE"),
            Column::new("DESCMAXIMO"),
            Column::new("FLAGINATIVO"),
            Column::new("FLAGNAOVENDER"),
            Column::new("FLAGCONTROLAESTOQUE"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            code: row.take("CODPROD")?,
            barcode: row.take("CODIGO")?,
            name: row.take("NOMEPROD")?,
            unit: row.take("UNIDADE")?,
            max_discount: row.take("DESCMAXIMO")?,
            inactive: read_flag(&mut row, "FLAGINATIVO")?,
            not_for_sale: read_flag(&mut row, "FLAGNAOVENDER")?,
            tracks_stock: read_flag(&mut row, "FLAGCONTROLAESTOQUE")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.code.clone().into(),
            self.barcode.clone().into(),
            self.name.clone().into(),
            self.unit.clone().into(),
            self.max_discount.into(),
            write_flag(self.inactive),
            write_flag(self.not_for_sale),
            write_flag(self.tracks_stock),
        ]
    }

    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
        match column {
            "CODPROD" => self.code = FromValue::from_value(value, column)?,
            other => return Err(DataError::declaration(format!("PRODUTO.{other} is not generated"))),
        }
        Ok(())
    }

    /// Units are stored upper-case and trimmed.
    fn before_insert(&mut self) -> Result<(), DataError> {
        self.unit = self.unit.trim().to_uppercase();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Stock {
    #[serde(rename = "CODPROD")]
    pub product: String,
    #[serde(rename = "CODEMPRESA")]
    pub company: i64,
    #[serde(rename = "CODSETORESTOQUE")]
    pub sector: Option<String>,
    #[serde(rename = "ESTATU")]
    pub quantity: f64,
    #[serde(rename = "LAST_CHANGE")]
    pub last_change: Option<NaiveDateTime>,
}

impl Entity for Stock {
    fn table_name() -> &'static str {
        "PRODUTOESTOQUE"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPROD").primary_key(),
            Column::new("CODEMPRESA").primary_key(),
            Column::new("CODSETORESTOQUE"),
            Column::new("ESTATU"),
            Column::new("LAST_CHANGE"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        let last_change = row
            .take::<Option<String>>("LAST_CHANGE")?
            .map(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT))
            .transpose()
            .map_err(|_| DataError::decode("LAST_CHANGE", "timestamp"))?;
        Ok(Self {
            product: row.take("CODPROD")?,
            company: row.take("CODEMPRESA")?,
            sector: row.take("CODSETORESTOQUE")?,
            quantity: row.take("ESTATU")?,
            last_change,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.product.clone().into(),
            self.company.into(),
            self.sector.clone().into(),
            self.quantity.into(),
            self.last_change
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .into(),
        ]
    }

    fn assign(&mut self, column: &str, _value: Value) -> Result<(), DataError> {
        Err(DataError::declaration(format!("PRODUTOESTOQUE.{column} is not generated")))
    }

    fn before_update(&mut self) -> Result<(), DataError> {
        self.last_change = Some(Local::now().naive_local());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Price {
    #[serde(rename = "CODPRODUTOPRECO")]
    pub id: Option<String>,
    #[serde(rename = "CODPROD")]
    pub product: String,
    #[serde(rename = "CODPRECO")]
    pub price_list: String,
    #[serde(rename = "PRECO")]
    pub price: f64,
}

impl Entity for Price {
    fn table_name() -> &'static str {
        "PRODUTOPRECO"
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("CODPRODUTOPRECO").primary_key().counter(9),
            Column::new("CODPROD"),
            Column::new("CODPRECO"),
            Column::new("PRECO"),
        ];
        COLUMNS
    }

    fn from_row(mut row: Row) -> Result<Self, DataError> {
        Ok(Self {
            id: row.take("CODPRODUTOPRECO")?,
            product: row.take("CODPROD")?,
            price_list: row.take("CODPRECO")?,
            price: row.take("PRECO")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.clone().into(),
            self.product.clone().into(),
            self.price_list.clone().into(),
            self.price.into(),
        ]
    }

    fn assign(&mut self, column: &str, value: Value) -> Result<(), DataError> {
        match column {
            "CODPRODUTOPRECO" => self.id = FromValue::from_value(value, column)?,
            other => return Err(DataError::declaration(format!("PRODUTOPRECO.{other} is not generated"))),
        }
        Ok(())
    }
}

/// A product with its default price and the stock of company 1.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "PRECO")]
    pub price: Option<f64>,
    #[serde(rename = "ESTOQUE")]
    pub stock: Option<Stock>,
}
