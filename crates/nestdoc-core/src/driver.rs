mod options;
pub use options::{ConnectOptions, Direction, FindOptions};

use crate::{async_trait, stmt, Result};

use std::fmt::Debug;

/// Opens physical connections to a document store.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Open a new physical connection.
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>>;
}

/// An open physical connection to one database.
#[async_trait]
pub trait Connection: Debug + Send + Sync + 'static {
    /// Returns a handle to the named collection.
    fn collection(&self, name: &str) -> Result<Box<dyn Collection>>;

    /// Close the physical connection. Called exactly once.
    async fn close(&self) -> Result<()>;
}

/// A named collection of documents.
#[async_trait]
pub trait Collection: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Insert a document, returning the identity the store assigned to it.
    async fn insert(&self, document: stmt::Document) -> Result<stmt::Value>;

    /// Set the fields of `document` on the document matching `filter`,
    /// leaving other stored fields untouched. Returns the number of matched
    /// documents.
    async fn update(&self, filter: stmt::Document, document: stmt::Document) -> Result<u64>;

    /// Remove the document matching `filter`. Returns the number removed.
    async fn remove(&self, filter: stmt::Document) -> Result<u64>;

    /// Find documents matching `filter`.
    async fn find(
        &self,
        filter: stmt::Document,
        options: FindOptions,
    ) -> Result<Vec<stmt::Document>>;
}
