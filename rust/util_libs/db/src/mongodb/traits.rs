use anyhow::Result;
use bson::Document;
use mongodb::options::IndexOptions;

/// Trait for defining MongoDB indices for a collection.
///
/// Implementors of this trait can define the indices that should be created
/// for their corresponding MongoDB collection. Index names are left to the
/// server (`<field>_<direction>`), so re-applying an identical definition is a
/// no-op and a diverging one under the same generated name is a conflict.
pub trait IntoIndexes {
    /// Converts the implementation into a vector of index definitions.
    ///
    /// # Returns
    ///
    /// A vector of tuples containing the index specification document and optional index options
    fn into_indices(self) -> Result<Vec<(Document, Option<IndexOptions>)>>;
}
