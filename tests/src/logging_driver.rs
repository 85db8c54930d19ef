use nestdoc_core::{
    async_trait,
    driver::{Collection, ConnectOptions, Connection, Driver, FindOptions},
    stmt::{Document, Value},
    Result,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// A driver wrapper that records every operation and counts physical
/// connects and closes.
#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,
    log: Arc<Log>,
}

/// State shared between the driver, its connections and the test.
#[derive(Debug, Default)]
pub(crate) struct Log {
    pub(crate) ops: Mutex<Vec<DriverOp>>,
    pub(crate) connects: AtomicUsize,
    pub(crate) closes: AtomicUsize,
}

/// An operation that completed successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOp {
    Insert {
        collection: String,
        document: Document,
    },
    Update {
        collection: String,
        filter: Document,
        document: Document,
    },
    Remove {
        collection: String,
        filter: Document,
    },
    Find {
        collection: String,
        filter: Document,
        options: FindOptions,
    },
}

impl LoggingDriver {
    pub fn new(driver: impl Driver) -> Self {
        Self {
            inner: Box::new(driver),
            log: Arc::default(),
        }
    }

    pub(crate) fn log_handle(&self) -> Arc<Log> {
        self.log.clone()
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        let inner = self.inner.connect(options).await?;
        self.log.connects.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(LoggingConnection {
            inner,
            log: self.log.clone(),
        }))
    }
}

#[derive(Debug)]
struct LoggingConnection {
    inner: Box<dyn Connection>,
    log: Arc<Log>,
}

#[async_trait]
impl Connection for LoggingConnection {
    fn collection(&self, name: &str) -> Result<Box<dyn Collection>> {
        Ok(Box::new(LoggingCollection {
            inner: self.inner.collection(name)?,
            log: self.log.clone(),
        }))
    }

    async fn close(&self) -> Result<()> {
        // Counted even when closing fails; the attempt is what matters
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

#[derive(Debug)]
struct LoggingCollection {
    inner: Box<dyn Collection>,
    log: Arc<Log>,
}

impl LoggingCollection {
    fn record(&self, op: DriverOp) {
        self.log
            .ops
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(op);
    }
}

#[async_trait]
impl Collection for LoggingCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert(&self, document: Document) -> Result<Value> {
        let id = self.inner.insert(document.clone()).await?;
        self.record(DriverOp::Insert {
            collection: self.name().to_string(),
            document,
        });
        Ok(id)
    }

    async fn update(&self, filter: Document, document: Document) -> Result<u64> {
        let matched = self.inner.update(filter.clone(), document.clone()).await?;
        self.record(DriverOp::Update {
            collection: self.name().to_string(),
            filter,
            document,
        });
        Ok(matched)
    }

    async fn remove(&self, filter: Document) -> Result<u64> {
        let removed = self.inner.remove(filter.clone()).await?;
        self.record(DriverOp::Remove {
            collection: self.name().to_string(),
            filter,
        });
        Ok(removed)
    }

    async fn find(&self, filter: Document, options: FindOptions) -> Result<Vec<Document>> {
        let documents = self.inner.find(filter.clone(), options.clone()).await?;
        self.record(DriverOp::Find {
            collection: self.name().to_string(),
            filter,
            options,
        });
        Ok(documents)
    }
}
