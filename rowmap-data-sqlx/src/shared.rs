use std::sync::Arc;

use rowmap_data::Connection;
use tokio::sync::{Mutex, MutexGuard};

/// A connection several tasks take turns on.
///
/// The guard returned by [`lock`](Self::lock) is the critical section: a
/// repository operation (and its key allocation) run under one guard can't
/// interleave with another task's statements.
///
/// ```ignore
/// let shared = SqlxConnection::connect("sqlite::memory:").await?.into_shared();
/// let mut conn = shared.lock().await;
/// Repository::<Product, _>::new(&mut *conn).insert(&mut product).await?;
/// conn.commit().await?;
/// ```
pub struct SharedConnection<C> {
    inner: Arc<Mutex<C>>,
}

impl<C: Connection> SharedConnection<C> {
    pub fn new(conn: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(conn)),
        }
    }

    /// Wait for exclusive use of the connection.
    pub async fn lock(&self) -> MutexGuard<'_, C> {
        self.inner.lock().await
    }

    /// Take the connection back once every other handle is gone.
    pub fn try_into_inner(self) -> Result<C, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<C> Clone for SharedConnection<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
