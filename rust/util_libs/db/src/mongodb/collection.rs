use bson::Document;
use mongodb::{options::IndexOptions, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::{error::DbError, traits::IntoIndexes};

/// Typed handle on one collection of the monitor database, carrying the index
/// catalogue declared by its schema `T`.
///
/// [`MongoCollection::new`] reconciles the schema's indices with the server;
/// [`MongoCollection::open`] only wraps the collection.
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync + Default + IntoIndexes,
{
    pub inner: Collection<T>,
    /// Indices requested from the server through this handle
    indices: Vec<IndexModel>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync + Default + Debug + IntoIndexes,
{
    /// Opens `collection_name` and creates every index declared by `T`.
    ///
    /// The collection is implicitly created by the server if it is missing.
    /// Fails with [`DbError::IndexConflict`] when an index of the same generated
    /// name already exists with another definition.
    pub async fn new(db: &Database, collection_name: &str) -> Result<Self, DbError> {
        let mut collection = Self::open(db, collection_name);
        collection.apply_indexing().await?;
        Ok(collection)
    }

    pub fn open(db: &Database, collection_name: &str) -> Self {
        MongoCollection {
            inner: db.collection::<T>(collection_name),
            indices: vec![],
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Index models declared by the schema `T`, in declaration order.
    pub fn schema_index_models() -> Result<Vec<IndexModel>, DbError> {
        let declared = T::default().into_indices().map_err(|e| {
            log::error!("Invalid index declaration: {}", e);
            DbError::Internal(e.to_string())
        })?;

        Ok(declared
            .into_iter()
            .map(|(keys, options)| index_model(keys, options))
            .collect())
    }

    /// Sends the schema's index catalogue to the server in one `createIndexes`.
    /// Identical existing definitions are accepted by the server as no-ops.
    pub async fn apply_indexing(&mut self) -> Result<&mut Self, DbError> {
        let indices = Self::schema_index_models()?;
        if indices.is_empty() {
            log::debug!("{} declares no indices", self.name());
            return Ok(self);
        }

        log::debug!(
            "Creating {} indices on {}: {:?}",
            indices.len(),
            self.name(),
            indices.iter().map(|i| &i.keys).collect::<Vec<_>>()
        );
        self.inner
            .create_indexes(indices.clone())
            .await
            .map_err(|e| DbError::from_driver("createIndexes", Some(self.name()), e))?;
        self.indices = indices;

        log::info!("Indices ready on {} ({})", self.name(), self.indices.len());
        Ok(self)
    }
}

/// Builds an unnamed index model; the server derives the name from the key pattern.
pub fn index_model(keys: Document, options: Option<IndexOptions>) -> IndexModel {
    IndexModel::builder().keys(keys).options(options).build()
}
