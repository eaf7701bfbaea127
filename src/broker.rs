use crate::*;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

thread_local! {
    static PROXY: RefCell<Option<Arc<ComponentManagerProxy>>> = const { RefCell::new(None) };
}

static BROKER: OnceLock<ComponentManagerBroker> = OnceLock::new();

/// Hands out one `ComponentManagerProxy` per thread.
///
/// The broker is created on first use and lives until the process exits. A thread's proxy is
/// created on its first request and forgotten when the proxy is disposed, so that a later
/// request creates a new one.
///
/// ```
/// use std::sync::Arc;
/// use msocm::*;
///
/// let original: Arc<dyn MsoComponentManager> =
///     Arc::new(StandardComponentManager::with_pump(QueuePump::new()));
/// let manager = ComponentManagerBroker::get_component_manager(original).unwrap();
/// assert_eq!(manager.ref_count(), 0);
/// ```
#[derive(Debug)]
pub struct ComponentManagerBroker {
    _priv: (),
}

impl ComponentManagerBroker {
    /// The process-wide broker.
    #[inline]
    pub fn instance() -> &'static Self {
        BROKER.get_or_init(|| {
            log::debug!("component manager broker created");
            Self { _priv: () }
        })
    }

    /// Returns the calling thread's proxy, creating it around `original` if needed.
    ///
    /// `original` is ignored when the thread already has a proxy.
    #[inline]
    pub fn get_component_manager(
        original: impl IntoComponentManager,
    ) -> Result<Arc<ComponentManagerProxy>> {
        Self::instance().get_proxy(original)
    }

    /// Forgets the calling thread's proxy.
    #[inline]
    pub fn clear_component_manager() {
        let proxy = PROXY.with_borrow_mut(|slot| slot.take());
        drop(proxy);
    }

    /// The calling thread's proxy, if one exists.
    #[inline]
    pub fn current() -> Option<Arc<ComponentManagerProxy>> {
        PROXY.with_borrow(|slot| slot.clone())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn get_proxy(&self, original: impl IntoComponentManager) -> Result<Arc<ComponentManagerProxy>> {
        if let Some(proxy) = Self::current() {
            if !proxy.is_disposed() {
                return Ok(proxy);
            }
            log::debug!("replacing a disposed component manager proxy");
        }
        let original = original.into_component_manager()?;
        let proxy = ComponentManagerProxy::new(original);
        let old = PROXY.with_borrow_mut(|slot| slot.replace(proxy.clone()));
        drop(old);
        log::debug!("component manager proxy created: {:?}", std::thread::current().id());
        Ok(proxy)
    }

    /// Forgets `proxy` if it is the calling thread's proxy.
    pub(crate) fn release(proxy: &ComponentManagerProxy) {
        let old = PROXY.with_borrow_mut(|slot| {
            if slot
                .as_ref()
                .is_some_and(|p| std::ptr::eq(Arc::as_ptr(p), proxy))
            {
                slot.take()
            } else {
                None
            }
        });
        drop(old);
    }
}
