use crate::*;
use std::thread::ThreadId;

/// The thread an object is bound to.
///
/// Component managers are thread-affine. An object captures the creating thread once and checks
/// it at the API boundary instead of comparing raw OS thread ids.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    #[inline]
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Binds to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Returns `Error::WrongThread` when called from another thread.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_same_thread() {
            Ok(())
        } else {
            Err(Error::WrongThread)
        }
    }
}
