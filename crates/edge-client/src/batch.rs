//! Deferred flushing through nested batch scopes.
//!
//! While at least one scope is open, mutations accumulate in the session's
//! diff. Closing the outermost scope flushes everything as one payload:
//!
//! ```no_run
//! # use edge_client::{GraphSession, NodeProperties};
//! # async fn demo(session: &mut GraphSession) -> edge_client::Result<()> {
//! let mut batch = session.batch();
//! let a = batch.create_node("start", &NodeProperties::new()).await?;
//! let b = batch.create_node("end", &NodeProperties::new()).await?;
//! batch.create_edge(a, b, 2.5).await?;
//! batch.finish().await?; // one request for all three mutations
//! # Ok(())
//! # }
//! ```

use std::ops::{Deref, DerefMut};

use crate::client::{GraphSession, Result};

impl GraphSession {
    /// Open a batch scope. Close it with [`BatchScope::finish`].
    pub fn batch(&mut self) -> BatchScope<'_> {
        self.enter_batch();
        BatchScope {
            session: self,
            open: true,
        }
    }

    /// Increase the batch depth. Pair every call with [`exit_batch`](Self::exit_batch).
    pub fn enter_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Decrease the batch depth, flushing the diff once it reaches zero.
    pub async fn exit_batch(&mut self) -> Result<()> {
        if self.batch_depth == 0 {
            tracing::warn!(graph_id = %self.graph_id(), "exit_batch called with no open batch scope");
        } else {
            self.batch_depth -= 1;
        }
        if self.batch_depth == 0 {
            self.flush().await?;
        }
        Ok(())
    }

    /// Enter (`true`) or exit (`false`) one level of batching.
    pub async fn set_batching_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            self.enter_batch();
            Ok(())
        } else {
            self.exit_batch().await
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    pub fn batch_depth(&self) -> usize {
        self.batch_depth
    }
}

/// One level of batching on a [`GraphSession`].
///
/// Dereferences to the session, so every session operation is available on
/// the scope. Scopes nest through [`BatchScope::batch`].
///
/// `Drop` cannot flush; a scope dropped without [`finish`](Self::finish) only
/// lowers the depth and leaves its mutations in the diff for the next flush.
#[must_use = "a batch scope must be closed with `finish().await`"]
pub struct BatchScope<'a> {
    session: &'a mut GraphSession,
    open: bool,
}

impl BatchScope<'_> {
    /// Open a nested scope.
    pub fn batch(&mut self) -> BatchScope<'_> {
        self.session.batch()
    }

    /// Close this scope; flushes if it was the outermost one.
    pub async fn finish(mut self) -> Result<()> {
        self.open = false;
        self.session.exit_batch().await
    }
}

impl Deref for BatchScope<'_> {
    type Target = GraphSession;

    fn deref(&self) -> &GraphSession {
        &*self.session
    }
}

impl DerefMut for BatchScope<'_> {
    fn deref_mut(&mut self) -> &mut GraphSession {
        &mut *self.session
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        if self.open {
            self.session.batch_depth = self.session.batch_depth.saturating_sub(1);
            tracing::warn!(
                graph_id = %self.session.graph_id(),
                pending = self.session.diff.len(),
                "Batch scope dropped without finish; pending diff stays buffered"
            );
        }
    }
}
