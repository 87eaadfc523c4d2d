use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::results::UpdateResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::{collection::MongoCollection, error::DbError, traits::IntoIndexes};

/// Typed document operations over a collection of `T`.
#[async_trait]
pub trait MongoDbAPI<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    type Error;

    async fn get_one_from(&self, filter: Document) -> Result<Option<T>, Self::Error>;

    async fn get_many_from(&self, filter: Document) -> Result<Vec<T>, Self::Error>;

    async fn count_in(&self, filter: Document) -> Result<u64, Self::Error>;

    /// Returns the `_id` the server assigned to `item`.
    async fn insert_one_into(&self, item: T) -> Result<ObjectId, Self::Error>;

    /// Create-or-replace: `$set`s every serialized field of `item` on the
    /// document matching `filter`, inserting it when nothing matches.
    async fn upsert_one_within(&self, filter: Document, item: &T)
        -> Result<UpdateResult, Self::Error>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one_from(&self, filter: Document) -> Result<u64, Self::Error>;
}

#[async_trait]
impl<T> MongoDbAPI<T> for MongoCollection<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync + Default + Debug + IntoIndexes,
{
    type Error = DbError;

    async fn get_one_from(&self, filter: Document) -> Result<Option<T>, Self::Error> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| DbError::from_driver("find", Some(self.name()), e))
    }

    async fn get_many_from(&self, filter: Document) -> Result<Vec<T>, Self::Error> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| DbError::from_driver("find", Some(self.name()), e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| DbError::from_driver("getMore", Some(self.name()), e))
    }

    async fn count_in(&self, filter: Document) -> Result<u64, Self::Error> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| DbError::from_driver("count", Some(self.name()), e))
    }

    async fn insert_one_into(&self, item: T) -> Result<ObjectId, Self::Error> {
        log::trace!("{} <- {:?}", self.name(), item);
        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(|e| DbError::from_driver("insert", Some(self.name()), e))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            DbError::Internal(format!(
                "Inserted document in {} has a non-ObjectId `_id`: {}",
                self.name(),
                result.inserted_id
            ))
        })
    }

    async fn upsert_one_within(
        &self,
        filter: Document,
        item: &T,
    ) -> Result<UpdateResult, Self::Error> {
        let fields = bson::to_document(item)?;
        log::debug!("Upserting into {} on {:?}", self.name(), filter);
        self.inner
            .update_one(filter, doc! { "$set": fields })
            .upsert(true)
            .await
            .map_err(|e| DbError::from_driver("update", Some(self.name()), e))
    }

    async fn delete_one_from(&self, filter: Document) -> Result<u64, Self::Error> {
        log::debug!("Deleting from {} on {:?}", self.name(), filter);
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| DbError::from_driver("delete", Some(self.name()), e))?;
        Ok(result.deleted_count)
    }
}
