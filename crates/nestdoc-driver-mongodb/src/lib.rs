mod value;

use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    options::{ClientOptions, FindOptions, ServerAddress},
    Client, Database,
};
use nestdoc_core::{
    async_trait,
    driver::{self, Collection, ConnectOptions, Connection, Direction, Driver},
    stmt, Error, Result,
};
use tracing::debug;

/// Driver for MongoDB, built on the official `mongodb` client.
#[derive(Debug, Default, Clone)]
pub struct MongoDb {
    app_name: Option<String>,
}

impl MongoDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Application name reported to the server in the connection handshake.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[async_trait]
impl Driver for MongoDb {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        let client_options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: options.host.clone(),
                port: Some(options.port),
            }])
            .app_name(self.app_name.clone())
            .build();

        let client = Client::with_options(client_options).map_err(Error::connection)?;
        let database = client.database(&options.database);

        // The client connects lazily; make sure the server is reachable now
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(Error::connection)?;
        debug!(address = %options.address(), "mongodb server reachable");

        Ok(Box::new(MongoConnection { client, database }))
    }
}

#[derive(Debug)]
struct MongoConnection {
    client: Client,
    database: Database,
}

#[async_trait]
impl Connection for MongoConnection {
    fn collection(&self, name: &str) -> Result<Box<dyn Collection>> {
        Ok(Box::new(MongoCollection {
            inner: self.database.collection::<bson::Document>(name),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[derive(Debug)]
struct MongoCollection {
    inner: mongodb::Collection<bson::Document>,
}

#[async_trait]
impl Collection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert(&self, document: stmt::Document) -> Result<stmt::Value> {
        let result = self
            .inner
            .insert_one(value::to_document(&document)?)
            .await
            .map_err(Error::driver)?;

        value::from_bson(result.inserted_id)
    }

    async fn update(&self, filter: stmt::Document, document: stmt::Document) -> Result<u64> {
        let update = doc! { "$set": value::to_document(&document)? };

        let result = self
            .inner
            .update_one(value::to_document(&filter)?, update)
            .await
            .map_err(Error::driver)?;

        Ok(result.matched_count)
    }

    async fn remove(&self, filter: stmt::Document) -> Result<u64> {
        let result = self
            .inner
            .delete_one(value::to_document(&filter)?)
            .await
            .map_err(Error::driver)?;

        Ok(result.deleted_count)
    }

    async fn find(
        &self,
        filter: stmt::Document,
        options: driver::FindOptions,
    ) -> Result<Vec<stmt::Document>> {
        let cursor = self
            .inner
            .find(value::to_document(&filter)?)
            .with_options(find_options(options)?)
            .await
            .map_err(Error::driver)?;

        let documents: Vec<bson::Document> = cursor.try_collect().await.map_err(Error::driver)?;

        documents.into_iter().map(value::from_document).collect()
    }
}

fn find_options(options: driver::FindOptions) -> Result<FindOptions> {
    let mut find_options = FindOptions::default();

    if !options.sort.is_empty() {
        let mut sort = bson::Document::new();
        for (field, direction) in options.sort {
            let order = match direction {
                Direction::Asc => 1,
                Direction::Desc => -1,
            };
            sort.insert(field, Bson::Int32(order));
        }
        find_options.sort = Some(sort);
    }

    if let Some(limit) = options.limit {
        let limit = i64::try_from(limit)
            .map_err(|_| nestdoc_core::err!("limit {limit} is out of range"))?;
        find_options.limit = Some(limit);
    }

    find_options.skip = options.skip;

    Ok(find_options)
}
