use bson::{doc, Bson, Document};
use db_utils::mongodb::DbError;
use mongodb::Database;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub count: i64,
    pub size: i64,
    pub avg_document_size: i64,
}

impl CollectionStats {
    pub fn from_reply(reply: &Document) -> Self {
        Self {
            count: number(reply, "count"),
            size: number(reply, "size"),
            avg_document_size: number(reply, "avgObjSize"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub database: String,
    pub database_size: i64,
    pub storage_size: i64,
    pub collections: usize,
    pub objects: i64,
    pub collections_stats: BTreeMap<String, CollectionStats>,
}

/// Collects `dbStats` plus `collStats` for every collection of `db`.
pub async fn database_stats(db: &Database) -> Result<DatabaseStats, DbError> {
    let db_stats = db
        .run_command(doc! { "dbStats": 1 })
        .await
        .map_err(|e| DbError::from_driver("dbStats", None, e))?;

    let names = db
        .list_collection_names()
        .await
        .map_err(|e| DbError::from_driver("listCollections", None, e))?;

    let mut collections_stats = BTreeMap::new();
    for name in names.iter() {
        let reply = db
            .run_command(doc! { "collStats": name.as_str() })
            .await
            .map_err(|e| DbError::from_driver("collStats", Some(name), e))?;
        collections_stats.insert(name.clone(), CollectionStats::from_reply(&reply));
    }

    Ok(DatabaseStats {
        database: db.name().to_string(),
        database_size: number(&db_stats, "dataSize"),
        storage_size: number(&db_stats, "storageSize"),
        collections: names.len(),
        objects: number(&db_stats, "objects"),
        collections_stats,
    })
}

// The server picks int32, int64 or double depending on magnitude.
fn number(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numbers_of_any_width() {
        let reply = doc! { "count": 3_i32, "size": 4096_i64, "avgObjSize": 1365.33 };
        assert_eq!(
            CollectionStats::from_reply(&reply),
            CollectionStats {
                count: 3,
                size: 4096,
                avg_document_size: 1365,
            }
        );
    }

    #[test]
    fn empty_collections_report_zero() {
        // `avgObjSize` is omitted by the server for empty collections
        let reply = doc! { "count": 0, "size": 0 };
        assert_eq!(CollectionStats::from_reply(&reply), CollectionStats::default());
    }
}
