//! SQLite Remote Store
//!
//! Local stand-in for the hosted backend. Implements the full
//! `RemoteStore` contract on one rusqlite connection, with the schema read
//! back from the database so table and column names are checked before
//! they reach SQL.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::db;
use super::traits::RemoteStore;
use crate::domain::{DomainError, DomainResult, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Json,
    Timestamp,
}

impl ColumnType {
    fn from_decl(decl: &str) -> Self {
        match decl.to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => ColumnType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => ColumnType::Real,
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "JSON" => ColumnType::Json,
            "TIMESTAMP" | "DATETIME" => ColumnType::Timestamp,
            _ => ColumnType::Text,
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    ty: ColumnType,
}

#[derive(Debug, Clone)]
struct TableSchema {
    name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    fn column(&self, name: &str) -> DomainResult<&Column> {
        self.columns.iter().find(|c| c.name == name).ok_or_else(|| {
            DomainError::InvalidInput(format!("unknown column '{}' on '{}'", name, self.name))
        })
    }

    fn has(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fill store-owned fields the caller left out
    fn stamp_insert(&self, record: &mut Record) {
        if self.has("id") && !record.contains_key("id") {
            record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        for column in ["created_at", "updated_at"] {
            if self.has(column) && record.get(column).map_or(true, Value::is_null) {
                record.insert(column.to_string(), Value::String(now_timestamp()));
            }
        }
    }

    fn stamp_update(&self, record: &mut Record) {
        if self.has("updated_at") && !record.contains_key("updated_at") {
            record.insert("updated_at".to_string(), Value::String(now_timestamp()));
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn internal(e: rusqlite::Error) -> DomainError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            DomainError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => DomainError::Internal(e.to_string()),
    }
}

fn to_sql_value(column: &Column, value: &Value) -> DomainResult<SqlValue> {
    if column.ty == ColumnType::Json {
        return Ok(match value {
            Value::Null => SqlValue::Null,
            other => SqlValue::Text(other.to_string()),
        });
    }
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(DomainError::InvalidInput(format!(
                    "number out of range for '{}': {}",
                    column.name, n
                )))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(DomainError::InvalidInput(format!(
            "column '{}' cannot hold structured values",
            column.name
        ))),
    }
}

fn from_sql_value(column: &Column, value: ValueRef<'_>) -> DomainResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if column.ty == ColumnType::Boolean => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DomainError::Internal(format!("non-utf8 text in '{}': {}", column.name, e)))?;
            if column.ty == ColumnType::Json {
                serde_json::from_str(text).map_err(|e| {
                    DomainError::Internal(format!("bad json in '{}': {}", column.name, e))
                })?
            } else {
                Value::String(text.to_string())
            }
        }
        ValueRef::Blob(_) => {
            return Err(DomainError::Internal(format!(
                "blob column '{}' is not supported",
                column.name
            )))
        }
    })
}

/// Split a record into checked column names and SQL values
fn bind_record(schema: &TableSchema, record: &Record) -> DomainResult<(Vec<String>, Vec<SqlValue>)> {
    let mut names = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (key, value) in record {
        let column = schema.column(key)?;
        names.push(column.name.clone());
        values.push(to_sql_value(column, value)?);
    }
    Ok((names, values))
}

fn insert_row(conn: &Connection, schema: &TableSchema, record: &Record) -> DomainResult<()> {
    let (names, values) = bind_record(schema, record)?;
    let columns = names.iter().map(|n| format!("\"{}\"", n)).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=names.len()).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ");
    let sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        schema.name, columns, placeholders
    );
    conn.execute(&sql, params_from_iter(values.iter())).map_err(internal)?;
    Ok(())
}

/// `UPDATE ... SET <record fields> WHERE key = ?`; returns rows touched
fn update_rows(
    conn: &Connection,
    schema: &TableSchema,
    key: &str,
    key_value: SqlValue,
    fields: &Record,
) -> DomainResult<usize> {
    let (names, mut values) = bind_record(schema, fields)?;
    let assignments = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("\"{}\" = ?{}", n, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE \"{}\" SET {} WHERE \"{}\" = ?{}",
        schema.name,
        assignments,
        key,
        names.len() + 1
    );
    values.push(key_value);
    conn.execute(&sql, params_from_iter(values.iter())).map_err(internal)
}

fn select_rows(
    conn: &Connection,
    schema: &TableSchema,
    filter: Option<(&str, SqlValue)>,
    order_by: &str,
) -> DomainResult<Vec<Record>> {
    let mut sql = format!("SELECT {} FROM \"{}\"", schema.select_list(), schema.name);
    let mut params = Vec::new();
    if let Some((column, value)) = filter {
        sql.push_str(&format!(" WHERE \"{}\" = ?1", column));
        params.push(value);
    }
    sql.push_str(&format!(" ORDER BY \"{}\" ASC, rowid ASC", order_by));

    let mut stmt = conn.prepare(&sql).map_err(internal)?;
    let mut rows = stmt.query(params_from_iter(params.iter())).map_err(internal)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(internal)? {
        let mut record = Record::new();
        for (i, column) in schema.columns.iter().enumerate() {
            let value = row.get_ref(i).map_err(internal)?;
            record.insert(column.name.clone(), from_sql_value(column, value)?);
        }
        records.push(record);
    }
    Ok(records)
}

fn find_row(conn: &Connection, schema: &TableSchema, key: &str, value: SqlValue) -> DomainResult<Record> {
    select_rows(conn, schema, Some((key, value)), key)?
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::NotFound(format!("row not found in '{}'", schema.name)))
}

fn load_schema(conn: &Connection) -> DomainResult<HashMap<String, TableSchema>> {
    let mut tables = Vec::new();
    {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .map_err(internal)?;
        let mut rows = stmt.query([]).map_err(internal)?;
        while let Some(row) = rows.next().map_err(internal)? {
            let name: String = row.get(0).map_err(internal)?;
            tables.push(name);
        }
    }

    let mut schema = HashMap::new();
    for table in tables {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info(\"{}\")", table))
            .map_err(internal)?;
        let mut rows = stmt.query([]).map_err(internal)?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next().map_err(internal)? {
            let name: String = row.get(1).map_err(internal)?;
            let decl: String = row.get(2).map_err(internal)?;
            columns.push(Column { name, ty: ColumnType::from_decl(&decl) });
        }
        schema.insert(table.clone(), TableSchema { name: table, columns });
    }
    Ok(schema)
}

/// SQLite implementation of the remote store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    schema: HashMap<String, TableSchema>,
}

impl SqliteStore {
    /// Wrap a migrated connection
    pub fn new(conn: Connection) -> DomainResult<Self> {
        let schema = load_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            schema,
        })
    }

    pub fn open(db_path: &Path) -> DomainResult<Self> {
        Self::new(db::open_db(db_path)?)
    }

    pub fn open_in_memory() -> DomainResult<Self> {
        Self::new(db::open_in_memory()?)
    }

    fn table(&self, table: &str) -> DomainResult<&TableSchema> {
        self.schema
            .get(table)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown table '{}'", table)))
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn select(&self, table: &str, order_by: &str) -> DomainResult<Vec<Record>> {
        let schema = self.table(table)?;
        schema.column(order_by)?;
        let conn = self.conn.lock().await;
        select_rows(&conn, schema, None, order_by)
    }

    async fn insert(&self, table: &str, mut record: Record) -> DomainResult<Record> {
        let schema = self.table(table)?;
        schema.stamp_insert(&mut record);
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DomainError::InvalidInput("id must be a string".to_string()))?;

        let conn = self.conn.lock().await;
        insert_row(&conn, schema, &record)?;
        find_row(&conn, schema, "id", SqlValue::Text(id))
    }

    async fn update(&self, table: &str, id: &str, mut patch: Record) -> DomainResult<Record> {
        let schema = self.table(table)?;
        patch.remove("id");
        schema.stamp_update(&mut patch);

        let conn = self.conn.lock().await;
        if patch.is_empty() {
            return find_row(&conn, schema, "id", SqlValue::Text(id.to_string()));
        }
        let touched = update_rows(&conn, schema, "id", SqlValue::Text(id.to_string()), &patch)?;
        if touched == 0 {
            return Err(DomainError::NotFound(format!("{} {} not found", table, id)));
        }
        find_row(&conn, schema, "id", SqlValue::Text(id.to_string()))
    }

    async fn upsert_batch(
        &self,
        table: &str,
        records: Vec<Record>,
        conflict_key: &str,
    ) -> DomainResult<()> {
        let schema = self.table(table)?;
        let key_column = schema.column(conflict_key)?.clone();

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(internal)?;
        for mut record in records {
            let key_value = record.remove(conflict_key).ok_or_else(|| {
                DomainError::InvalidInput(format!("upsert record without '{}'", conflict_key))
            })?;
            let key_sql = to_sql_value(&key_column, &key_value)?;
            schema.stamp_update(&mut record);

            let touched = if record.is_empty() {
                let exists = select_rows(&tx, schema, Some((conflict_key, key_sql.clone())), conflict_key)?;
                exists.len()
            } else {
                update_rows(&tx, schema, conflict_key, key_sql, &record)?
            };
            if touched == 0 {
                record.insert(conflict_key.to_string(), key_value);
                schema.stamp_insert(&mut record);
                insert_row(&tx, schema, &record)?;
            }
        }
        // Dropping an uncommitted transaction rolls every row back
        tx.commit().map_err(internal)
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        let schema = self.table(table)?;
        let conn = self.conn.lock().await;
        let removed = conn
            .execute(&format!("DELETE FROM \"{}\" WHERE id = ?1", schema.name), [id])
            .map_err(internal)?;
        if removed == 0 {
            return Err(DomainError::NotFound(format!("{} {} not found", table, id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = store
            .insert(
                "client_logos",
                record(json!({ "name": "Acme", "image_url": "https://x/a.png", "position": 0 })),
            )
            .await
            .unwrap();

        let id = row["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(row["created_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(row["link_url"], Value::Null);
    }

    #[tokio::test]
    async fn test_select_orders_ascending() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (name, position) in [("c", 2), ("a", 0), ("b", 1)] {
            store
                .insert(
                    "client_logos",
                    record(json!({ "name": name, "image_url": "https://x/y.png", "position": position })),
                )
                .await
                .unwrap();
        }
        let rows = store.select("client_logos", "position").await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_json_and_boolean_columns_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = store
            .insert(
                "projects",
                record(json!({
                    "title": "Depot",
                    "gallery": ["https://x/1.jpg", "https://x/2.jpg"],
                    "featured": true
                })),
            )
            .await
            .unwrap();
        assert_eq!(row["gallery"], json!(["https://x/1.jpg", "https://x/2.jpg"]));
        assert_eq!(row["featured"], json!(true));
        assert_eq!(row["category"], json!("residential"));
    }

    #[tokio::test]
    async fn test_unknown_table_and_column_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.select("users; DROP TABLE projects", "id").await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            store.select("projects", "title\"--").await,
            Err(DomainError::InvalidInput(_))
        ));
        let bad = record(json!({ "name": "A", "image_url": "https://x", "bogus": 1 }));
        assert!(store.insert("client_logos", bad).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            store.update("client_logos", &missing, record(json!({ "name": "B" }))).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("client_logos", &missing).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_updates_only_listed_fields_and_inserts_new() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = store
            .insert("page_heroes", record(json!({ "page": "home", "image_url": "https://x/old.jpg" })))
            .await
            .unwrap();

        store
            .upsert_batch(
                "page_heroes",
                vec![
                    record(json!({ "page": "home", "image_url": "https://x/new.jpg" })),
                    record(json!({ "page": "about", "image_url": "https://x/about.jpg" })),
                ],
                "page",
            )
            .await
            .unwrap();

        let rows = store.select("page_heroes", "page").await.unwrap();
        assert_eq!(rows.len(), 2);
        let home = rows.iter().find(|r| r["page"] == json!("home")).unwrap();
        assert_eq!(home["id"], row["id"]);
        assert_eq!(home["image_url"], json!("https://x/new.jpg"));
    }

    #[tokio::test]
    async fn test_upsert_batch_is_all_or_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = store
            .insert("client_logos", record(json!({ "name": "A", "image_url": "https://x", "position": 0 })))
            .await
            .unwrap();

        // Second record has no image_url, so its insert violates NOT NULL
        let result = store
            .upsert_batch(
                "client_logos",
                vec![
                    record(json!({ "id": row["id"], "position": 5 })),
                    record(json!({ "id": Uuid::new_v4().to_string(), "position": 1 })),
                ],
                "id",
            )
            .await;
        assert!(result.is_err());

        let rows = store.select("client_logos", "position").await.unwrap();
        assert_eq!(rows[0]["position"], json!(0));
    }
}
