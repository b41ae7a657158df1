use cardbox_store::{ComponentStore, StoreResult, StoredComponent};
use cardbox_types::ComponentHash;
use mongodb::bson::doc;
use mongodb::sync::Collection;
use tracing::debug;

use crate::documents::{by_id, ComponentDocument};
use crate::error::store_error;

/// Component store over the `components` collection.
///
/// Writes are a single `$setOnInsert` upsert keyed by hash, so concurrent
/// writers of the same content never produce a second document.
#[derive(Clone, Debug)]
pub struct MongoComponentStore {
    components: Collection<ComponentDocument>,
}

impl MongoComponentStore {
    pub fn new(components: Collection<ComponentDocument>) -> Self {
        Self { components }
    }

    pub fn collection(&self) -> &Collection<ComponentDocument> {
        &self.components
    }

    /// Number of stored components.
    pub fn count(&self) -> StoreResult<u64> {
        self.components
            .count_documents(doc! {})
            .run()
            .map_err(store_error)
    }
}

impl ComponentStore for MongoComponentStore {
    fn read(&self, hash: &ComponentHash) -> StoreResult<Option<StoredComponent>> {
        let document = self
            .components
            .find_one(by_id(hash.to_hex()))
            .run()
            .map_err(store_error)?;
        document.map(ComponentDocument::into_stored).transpose()
    }

    fn write(&self, hash: &ComponentHash, stored: &StoredComponent) -> StoreResult<bool> {
        let document = ComponentDocument::new(hash, stored);
        let result = self
            .components
            .update_one(by_id(&document.id), doc! { "$setOnInsert": document.insert_fields() })
            .upsert(true)
            .run()
            .map_err(store_error)?;
        let written = result.upserted_id.is_some();
        if written {
            debug!(hash = %hash.short_hex(), kind = %stored.kind, "component document inserted");
        }
        Ok(written)
    }

    fn exists(&self, hash: &ComponentHash) -> StoreResult<bool> {
        let count = self
            .components
            .count_documents(by_id(hash.to_hex()))
            .run()
            .map_err(store_error)?;
        Ok(count > 0)
    }

    fn delete(&self, hash: &ComponentHash) -> StoreResult<bool> {
        let result = self
            .components
            .delete_one(by_id(hash.to_hex()))
            .run()
            .map_err(store_error)?;
        Ok(result.deleted_count > 0)
    }
}
