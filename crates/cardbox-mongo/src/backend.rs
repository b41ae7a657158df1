use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::sync::{Client, Database};
use tracing::info;

use crate::config::MongoConfig;
use crate::documents::{COMPONENTS_COLLECTION, STRUCTURE_COLLECTION};
use crate::error::{MongoError, MongoResult};
use crate::store::MongoComponentStore;
use crate::structure::MongoStructureIndex;

/// A live connection to the document database.
///
/// Connecting pings the server and creates the structure root, so a
/// returned backend is known to be reachable and usable.
#[derive(Clone, Debug)]
pub struct MongoBackend {
    client: Client,
    database: Database,
}

impl MongoBackend {
    pub fn connect(config: &MongoConfig) -> MongoResult<Self> {
        let address = config.address();
        let client = Client::with_options(client_options(config)?)?;
        let database = client.database(&config.database);

        database
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|source| MongoError::Unreachable {
                address: address.clone(),
                source,
            })?;

        let backend = Self { client, database };
        backend
            .structure_index()
            .ensure_root()
            .map_err(|e| MongoError::Setup(e.to_string()))?;

        info!(%address, database = %config.database, "connected to document database");
        Ok(backend)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn component_store(&self) -> MongoComponentStore {
        MongoComponentStore::new(self.database.collection(COMPONENTS_COLLECTION))
    }

    pub fn structure_index(&self) -> MongoStructureIndex {
        MongoStructureIndex::new(self.database.collection(STRUCTURE_COLLECTION))
    }

    /// Release this handle's client. Collection handles obtained from it
    /// stay valid until they are dropped too.
    pub fn shutdown(self) {
        drop(self.client);
        info!("document database connection closed");
    }
}

/// Driver options for `config`.
pub fn client_options(config: &MongoConfig) -> MongoResult<ClientOptions> {
    let address = config.address();
    let host = ServerAddress::parse(&address).map_err(|source| MongoError::InvalidAddress {
        address: address.clone(),
        source,
    })?;

    let mut options = ClientOptions::default();
    options.hosts = vec![host];
    options.app_name = Some("cardbox".into());
    options.connect_timeout = Some(config.connect_timeout());
    options.server_selection_timeout = Some(config.connect_timeout());
    if let Some(username) = &config.username {
        let mut credential = Credential::default();
        credential.username = Some(username.clone());
        credential.password = config.password.clone();
        options.credential = Some(credential);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use cardbox_store::{Analytic, Block, Card, Cite, Component, ComponentStore};
    use cardbox_structure::{StructureError, StructureIndex, StructurePath};

    #[test]
    fn options_from_defaults() {
        let options = client_options(&MongoConfig::default()).unwrap();
        assert_eq!(options.hosts, vec![ServerAddress::parse("127.0.0.1:27017").unwrap()]);
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(5)));
        assert!(options.credential.is_none());
    }

    #[test]
    fn options_carry_credentials() {
        let config = MongoConfig {
            username: Some("debater".into()),
            password: Some("secret".into()),
            ..MongoConfig::default()
        };
        let credential = client_options(&config).unwrap().credential.unwrap();
        assert_eq!(credential.username.as_deref(), Some("debater"));
        assert_eq!(credential.password.as_deref(), Some("secret"));
    }

    #[test]
    fn unreachable_server_fails_fast() {
        let config = MongoConfig {
            port: 1,
            connect_timeout_ms: 200,
            ..MongoConfig::default()
        };
        assert!(matches!(
            MongoBackend::connect(&config),
            Err(MongoError::Unreachable { .. })
        ));
    }

    // ---- Live server ----

    fn live() -> MongoBackend {
        let config = MongoConfig {
            database: format!("cardbox_test_{}", std::process::id()),
            ..MongoConfig::default()
        };
        MongoBackend::connect(&config).unwrap()
    }

    fn smith(text: &str) -> Card {
        Card::new(Cite::new("Smith", "2010", "Renowned writer of cards"), text)
    }

    #[test]
    #[ignore = "needs a MongoDB server on 127.0.0.1:27017"]
    fn live_store_and_structure() {
        let backend = live();
        let store = backend.component_store();
        let index = backend.structure_index();

        let card = smith("text");
        let card2 = smith("textAAA");
        let block: Component = Block::new("Test Block")
            .with(card.clone())
            .with(card2.clone())
            .with(Analytic::new("This is an analytic"))
            .into();
        let hash = store.store(&block).unwrap();
        assert_eq!(store.store(&block).unwrap(), hash);
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.retrieve_and_load(&hash).unwrap(), block);

        let dir = StructurePath::from(["test_dir"]);
        let child_dir = dir.child("test_child_dir");
        index.add_child(&StructurePath::root(), "test_dir").unwrap();
        index.add_child(&dir, "test_child_dir").unwrap();
        index.add_child(&dir, "test_child_dir").unwrap();
        index.add_content(&dir, &card.clone().into()).unwrap();
        index.add_content(&dir, &card2.clone().into()).unwrap();
        index.add_content(&child_dir, &card2.clone().into()).unwrap();
        index.add_content(&child_dir, &block).unwrap();

        assert_eq!(index.children(&dir).unwrap(), vec!["test_child_dir"]);
        let top = index.get_content(&dir, &store).unwrap();
        assert_eq!(top, vec![Component::from(card), Component::from(card2)]);
        let nested = index.get_content(&child_dir, &store).unwrap();
        assert!(!nested[1].is_loaded());

        let missing = index.children(&child_dir.child("nope")).unwrap_err();
        assert!(matches!(missing, StructureError::PathNotFound(_)));

        backend.database().drop().run().unwrap();
        backend.shutdown();
    }

    #[test]
    #[ignore = "needs a MongoDB server on 127.0.0.1:27017"]
    fn live_dangling_hash_surfaces_not_found() {
        let backend = live();
        let store = backend.component_store();
        let index = backend.structure_index();

        let card: Component = smith("removed").into();
        let hash = store.store(&card).unwrap();
        index.add_content(&StructurePath::root(), &card).unwrap();
        assert!(index.remove_content(&StructurePath::root(), &hash).unwrap());
        index.add_content(&StructurePath::root(), &card).unwrap();
        store.delete(&hash).unwrap();

        let err = index.get_content(&StructurePath::root(), &store).unwrap_err();
        assert!(matches!(err, StructureError::Store(e) if e.is_not_found()));

        backend.database().drop().run().unwrap();
        backend.shutdown();
    }
}
