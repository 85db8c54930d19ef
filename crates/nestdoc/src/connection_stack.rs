use nestdoc_core::{
    driver::{ConnectOptions, Connection, Driver},
    Result,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{runtime::Handle, sync::OwnedMutexGuard};
use tracing::{debug, error, trace};

/// Connections held by one logical execution context.
///
/// Nested data-access calls made with the same stack share one physical
/// connection. The connection is opened when the stack goes from empty to
/// non-empty and closed when it becomes empty again. Concurrent acquirers on
/// an empty stack wait for the first one to connect and then share its
/// connection, so a stack never has more than one physical connection open.
///
/// A stack is created by [`Adapter::connection_stack`] and can only be used
/// with that adapter.
///
/// [`Adapter::connection_stack`]: crate::Adapter::connection_stack
#[derive(Debug)]
pub struct ConnectionStack {
    /// Identifier of the adapter that created this stack
    owner: u64,

    state: Mutex<State>,

    /// Held while the physical connection is being opened or closed
    lifecycle: Arc<tokio::sync::Mutex<()>>,
}

#[derive(Debug, Default)]
struct State {
    frames: Vec<Arc<dyn Connection>>,

    /// Acquirers waiting for a connection to be opened
    waiting: usize,

    /// Connection left behind by the last frame for a waiting acquirer
    handoff: Option<Arc<dyn Connection>>,
}

/// One acquisition on a [`ConnectionStack`].
///
/// The frame is popped when released or dropped. Dropping the last frame
/// without releasing it closes the connection on a spawned task.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    stack: &'a ConnectionStack,
    connection: Arc<dyn Connection>,
    held: bool,
}

/// Registration of an acquirer waiting for the lifecycle lock.
struct Waiter<'a> {
    stack: &'a ConnectionStack,
}

/// The last connection of a stack, waiting to be closed.
struct Closing {
    connection: Arc<dyn Connection>,
    lifecycle: Arc<tokio::sync::Mutex<()>>,

    /// Taken together with the connection, if nobody else held it
    locked: Option<OwnedMutexGuard<()>>,
}

impl ConnectionStack {
    pub(crate) fn new(owner: u64) -> ConnectionStack {
        ConnectionStack {
            owner,
            state: Mutex::new(State::default()),
            lifecycle: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Number of acquisitions not yet released.
    pub fn depth(&self) -> usize {
        self.state().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// Pushes a frame and returns it, opening a physical connection if the
    /// stack was empty.
    pub(crate) async fn acquire(
        &self,
        owner: u64,
        driver: &dyn Driver,
        options: &ConnectOptions,
    ) -> Result<Frame<'_>> {
        self.check_owner(owner)?;

        {
            let mut state = self.state();
            if let Some(frame) = self.reuse(&mut state) {
                return Ok(frame);
            }
            state.waiting += 1;
        }

        let _waiter = Waiter { stack: self };
        let _lifecycle = self.lifecycle.lock().await;

        // Someone else connected while we waited
        let reused = self.reuse(&mut self.state());
        if let Some(frame) = reused {
            return Ok(frame);
        }

        let connection: Arc<dyn Connection> = Arc::from(driver.connect(options).await?);
        debug!(address = %options.address(), database = %options.database, "opened connection");

        let mut state = self.state();
        state.frames.push(connection.clone());
        trace!(depth = state.frames.len(), "pushed connection");

        Ok(Frame {
            stack: self,
            connection,
            held: true,
        })
    }

    /// Pops a frame. Popping the last frame closes the physical connection.
    pub(crate) async fn release(&self, owner: u64) -> Result<()> {
        self.check_owner(owner)?;

        if let Some(closing) = self.pop()? {
            closing.close().await?;
        }
        Ok(())
    }

    /// Pushes a frame sharing the open connection, if there is one.
    fn reuse(&self, state: &mut State) -> Option<Frame<'_>> {
        let connection = state.frames.last().cloned().or_else(|| state.handoff.take())?;
        state.frames.push(connection.clone());
        trace!(depth = state.frames.len(), "reusing connection");

        Some(Frame {
            stack: self,
            connection,
            held: true,
        })
    }

    /// Pops the top frame, returning the connection when nobody else needs
    /// it any more.
    fn pop(&self) -> Result<Option<Closing>> {
        let mut state = self.state();

        let Some(connection) = state.frames.pop() else {
            nestdoc_core::bail!("released a connection that was never acquired");
        };
        trace!(depth = state.frames.len(), "popped connection");

        if !state.frames.is_empty() {
            return Ok(None);
        }

        if state.waiting > 0 {
            state.handoff = Some(connection);
            return Ok(None);
        }

        Ok(Some(self.closing(connection)))
    }

    fn closing(&self, connection: Arc<dyn Connection>) -> Closing {
        Closing {
            connection,
            lifecycle: self.lifecycle.clone(),
            locked: self.lifecycle.clone().try_lock_owned().ok(),
        }
    }

    fn check_owner(&self, owner: u64) -> Result<()> {
        if owner != self.owner {
            nestdoc_core::bail!("connection stack used with an adapter that did not create it");
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Frame<'_> {
    pub(crate) fn connection(&self) -> &dyn Connection {
        &*self.connection
    }

    /// Leaves the frame on the stack for an explicit
    /// [`ConnectionStack::release`] and returns its connection.
    pub(crate) fn keep(mut self) -> Arc<dyn Connection> {
        self.held = false;
        self.connection.clone()
    }

    /// Pops the frame, closing the connection if it was the last one.
    pub(crate) async fn release(mut self) -> Result<()> {
        self.held = false;

        if let Some(closing) = self.stack.pop()? {
            closing.close().await?;
        }
        Ok(())
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        if !self.held {
            return;
        }

        match self.stack.pop() {
            Ok(Some(closing)) => closing.close_detached(),
            Ok(None) => {}
            Err(err) => error!("{err}"),
        }
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        let mut state = self.stack.state();
        state.waiting -= 1;

        // The last waiter gave up on a connection left for it
        if state.waiting == 0 && state.frames.is_empty() {
            if let Some(connection) = state.handoff.take() {
                drop(state);
                self.stack.closing(connection).close_detached();
            }
        }
    }
}

impl Closing {
    async fn close(self) -> Result<()> {
        let _lifecycle = match self.locked {
            Some(locked) => locked,
            None => self.lifecycle.lock_owned().await,
        };

        self.connection.close().await?;
        debug!("closed connection");
        Ok(())
    }

    /// Closes the connection on a spawned task, for callers that cannot
    /// await.
    fn close_detached(self) {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = self.close().await {
                        error!("{err}");
                    }
                });
            }
            Err(_) => debug!("no runtime to close an abandoned connection; dropping it"),
        }
    }
}
