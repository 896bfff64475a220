use std::env;

pub(crate) const TABLE_ENV: &str = "PRODUCTS_TABLE";
pub(crate) const DEFAULT_TABLE: &str = "tabla-productos";

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) table_name: String,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self::from_table(env::var(TABLE_ENV).ok())
    }

    fn from_table(table: Option<String>) -> Self {
        let table_name = match table {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => DEFAULT_TABLE.to_string(),
        };
        Config { table_name }
    }
}
