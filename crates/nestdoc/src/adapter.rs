mod config;
pub use config::Config;

use crate::{connection_stack::Frame, flatten, flatten_attributes, ConnectionStack, Query, Resource};
use nestdoc_core::{
    driver::{Collection, Connection, Driver},
    schema::{Model, IDENTITY_FIELD},
    stmt::Document,
    Error, Result,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::{debug, error};

static NEXT_ADAPTER_ID: AtomicU64 = AtomicU64::new(0);

/// Persists resources in a document store.
///
/// Every operation takes the [`ConnectionStack`] of the calling execution
/// context. An operation pushes a frame for its duration, so operations
/// nested inside an outer [`Adapter::acquire`] share its connection.
///
/// Cloning an adapter is cheap; clones are the same adapter instance.
#[derive(Debug, Clone)]
pub struct Adapter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: u64,
    config: Config,
    driver: Box<dyn Driver>,
}

impl Adapter {
    pub fn new(config: Config, driver: impl Driver) -> Adapter {
        Adapter {
            inner: Arc::new(Inner {
                id: NEXT_ADAPTER_ID.fetch_add(1, Ordering::Relaxed),
                config,
                driver: Box::new(driver),
            }),
        }
    }

    /// An adapter using the MongoDB driver.
    #[cfg(feature = "mongodb")]
    pub fn mongodb(config: Config) -> Adapter {
        Adapter::new(config, nestdoc_driver_mongodb::MongoDb::new())
    }

    /// Name of the adapter instance, used as the repository name when
    /// resolving collection names.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Creates a connection stack for one logical execution context.
    pub fn connection_stack(&self) -> ConnectionStack {
        ConnectionStack::new(self.inner.id)
    }

    /// Pushes a frame on `cx`, connecting if it is empty.
    ///
    /// Every successful call must be paired with [`Adapter::release`].
    pub async fn acquire(&self, cx: &ConnectionStack) -> Result<Arc<dyn Connection>> {
        self.frame(cx).await.map(Frame::keep)
    }

    /// Pops a frame from `cx`, closing the connection when it was the last.
    pub async fn release(&self, cx: &ConnectionStack) -> Result<()> {
        cx.release(self.inner.id)
            .await
            .inspect_err(|err| error!("{err}"))
    }

    /// Inserts each resource, writing the store-assigned identity back onto
    /// it. Returns the number of resources created.
    pub async fn create(&self, cx: &ConnectionStack, resources: &mut [Resource]) -> Result<usize> {
        let frame = self.frame(cx).await?;
        let result = self.create_in(frame.connection(), resources).await;
        self.finish(frame, result).await
    }

    async fn create_in(&self, connection: &dyn Connection, resources: &mut [Resource]) -> Result<usize> {
        for resource in resources.iter_mut() {
            let model = resource.model().clone();
            if model.is_embeddable_only() {
                nestdoc_core::bail!(
                    "model `{}` has no key and can only be stored embedded in a parent",
                    model.name
                );
            }

            let collection = self.collection(connection, &model)?;
            let id = collection.insert(flatten(resource)?).await?;

            let assigns_identity = model
                .key_fields()
                .next()
                .is_some_and(|field| field.is_identity());
            if assigns_identity {
                resource.set_key(vec![id])?;
            }

            debug!(collection = collection.name(), "created resource");
        }

        Ok(resources.len())
    }

    /// Reads the resources matching `query` as saved, clean resources.
    pub async fn read(&self, cx: &ConnectionStack, query: &Query) -> Result<Vec<Resource>> {
        let (filter, options) = query.translate()?;

        let frame = self.frame(cx).await?;
        let result = async {
            let collection = self.collection(frame.connection(), query.model())?;
            let documents = collection.find(filter, options).await?;
            debug!(collection = collection.name(), count = documents.len(), "read resources");

            documents
                .into_iter()
                .map(|document| Resource::load(query.model(), document))
                .collect::<Result<Vec<_>>>()
        }
        .await;

        self.finish(frame, result).await
    }

    /// Writes each resource, with `attributes` (by property name) taking
    /// precedence over the resource's own values. Returns the number of
    /// resources updated.
    pub async fn update(
        &self,
        cx: &ConnectionStack,
        attributes: &Document,
        resources: &[Resource],
    ) -> Result<usize> {
        let frame = self.frame(cx).await?;
        let result = self.update_in(frame.connection(), attributes, resources).await;
        self.finish(frame, result).await
    }

    async fn update_in(
        &self,
        connection: &dyn Connection,
        attributes: &Document,
        resources: &[Resource],
    ) -> Result<usize> {
        for resource in resources {
            let model = resource.model();
            let collection = self.collection(connection, model)?;

            let filter = key_filter(resource)?;
            let mut document = flatten(resource)?;
            document.extend(flatten_attributes(model, attributes)?);
            document.shift_remove(IDENTITY_FIELD);

            let matched = collection.update(filter, document).await?;
            debug!(collection = collection.name(), matched, "updated resource");
        }

        Ok(resources.len())
    }

    /// Removes each resource by key. Returns the number of resources
    /// deleted.
    pub async fn delete(&self, cx: &ConnectionStack, resources: &[Resource]) -> Result<usize> {
        let frame = self.frame(cx).await?;
        let result = async {
            for resource in resources {
                let collection = self.collection(frame.connection(), resource.model())?;
                let removed = collection.remove(key_filter(resource)?).await?;
                debug!(collection = collection.name(), removed, "deleted resource");
            }

            Ok::<_, Error>(resources.len())
        }
        .await;

        self.finish(frame, result).await
    }

    /// Persists a resource: new resources are created and dirty ones
    /// updated. Returns `false` without writing if there was nothing to
    /// save.
    ///
    /// After a successful write the resource and all of its loaded
    /// embedments are clean.
    pub async fn save(&self, cx: &ConnectionStack, resource: &mut Resource) -> Result<bool> {
        if resource.is_new() {
            self.create(cx, std::slice::from_mut(resource)).await?;
        } else if resource.is_dirty() {
            self.update(cx, &Document::new(), std::slice::from_ref(resource))
                .await?;
        } else {
            return Ok(false);
        }

        resource.mark_saved();
        Ok(true)
    }

    fn collection(&self, connection: &dyn Connection, model: &Model) -> Result<Box<dyn Collection>> {
        connection
            .collection(&model.storage_name(self.name()))
            .inspect_err(|err| error!("{err}"))
    }

    /// Pushes the frame of one operation. The frame is popped even if the
    /// operation is cancelled or panics.
    async fn frame<'a>(&self, cx: &'a ConnectionStack) -> Result<Frame<'a>> {
        cx.acquire(
            self.inner.id,
            &*self.inner.driver,
            &self.inner.config.connect_options(),
        )
        .await
        .inspect_err(|err| error!("{err}"))
    }

    /// Releases the operation's frame, then returns its result. An error
    /// from the operation takes precedence over one from releasing.
    async fn finish<T>(&self, frame: Frame<'_>, result: Result<T>) -> Result<T> {
        let released = frame.release().await.inspect_err(|err| error!("{err}"));
        let value = result?;
        released?;
        Ok(value)
    }
}

/// Filter addressing the stored document of `resource`, keyed by storage
/// field name.
fn key_filter(resource: &Resource) -> Result<Document> {
    let model = resource.model();

    model
        .key_fields()
        .zip(resource.key())
        .map(|(field, value)| {
            if value.is_null() {
                return Err(Error::missing_key(model.name.to_string(), field.app_name()));
            }
            Ok((field.storage_name().to_string(), field.codec.dump(&value)?))
        })
        .collect()
}
