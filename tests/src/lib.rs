pub use exec_log::ExecLog;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingDriver};

pub use memory_driver::{Fault, MemoryDriver};


pub use std_util::*;

use nestdoc::{Adapter, Config};

/// An adapter over an in-memory store, with every driver operation logged.
pub struct DbTest {
    pub adapter: Adapter,

    /// Handle to the store behind the adapter
    pub store: MemoryDriver,

    log: ExecLog,
}

impl DbTest {
    pub fn new() -> DbTest {
        DbTest::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> DbTest {
        init_tracing();

        let store = MemoryDriver::new();
        let driver = LoggingDriver::new(store.clone());
        let log = ExecLog::new(driver.log_handle());

        DbTest {
            adapter: Adapter::new(config, driver),
            store,
            log,
        }
    }

    pub fn log(&mut self) -> &mut ExecLog {
        &mut self.log
    }
}

impl Default for DbTest {
    fn default() -> Self {
        DbTest::new()
    }
}

fn init_tracing() {
    // Several tests share a process; only the first install wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
