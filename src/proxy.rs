use crate::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Local ids wrap back to 1 when they reach this value.
const COMPONENT_ID_LIMIT: u32 = i32::MAX as u32;

type Entry = (ComponentId, Arc<dyn MsoComponent>);

/// Registered components in registration order.
#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    fn get(&self, id: ComponentId) -> Option<Arc<dyn MsoComponent>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, c)| c.clone())
    }

    fn contains(&self, id: ComponentId) -> bool {
        self.entries.iter().any(|(k, _)| *k == id)
    }

    fn insert(&mut self, id: ComponentId, component: Arc<dyn MsoComponent>) {
        debug_assert!(!self.contains(id));
        self.entries.push((id, component));
    }

    fn remove(&mut self, id: ComponentId) -> Option<Arc<dyn MsoComponent>> {
        let index = self.entries.iter().position(|(k, _)| *k == id)?;
        Some(self.entries.remove(index).1)
    }

    fn ids(&self) -> Vec<ComponentId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    fn components(&self) -> Vec<Arc<dyn MsoComponent>> {
        self.entries.iter().map(|(_, c)| c.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }
}

struct State {
    original: Option<Arc<dyn MsoComponentManager>>,
    ref_count: usize,
    component_id: Option<ComponentId>,
    next_component_id: u32,
    id_limit: u32,
    registry: Registry,
    active: Option<Entry>,
    tracking: Option<Entry>,
}

impl State {
    fn new(original: Arc<dyn MsoComponentManager>) -> Self {
        Self {
            original: Some(original),
            ref_count: 0,
            component_id: None,
            next_component_id: 0,
            id_limit: COMPONENT_ID_LIMIT,
            registry: Registry::default(),
            active: None,
            tracking: None,
        }
    }

    /// Picks the next free id. Ids in use are skipped; the scan may wrap around once.
    fn allocate_id(&mut self) -> Result<ComponentId> {
        self.next_component_id += 1;
        if self.next_component_id >= self.id_limit {
            self.next_component_id = 1;
        }
        let mut wrapped = false;
        while self.registry.contains(ComponentId(self.next_component_id)) {
            self.next_component_id += 1;
            if self.next_component_id >= self.id_limit {
                if wrapped {
                    return Err(Error::OutOfComponentIds);
                }
                wrapped = true;
                self.next_component_id = 1;
            }
        }
        Ok(ComponentId(self.next_component_id))
    }

    fn current(&self) -> Option<Arc<dyn MsoComponent>> {
        self.tracking
            .as_ref()
            .or(self.active.as_ref())
            .map(|(_, c)| c.clone())
    }

    fn forget(&mut self, id: ComponentId) {
        if self.active.as_ref().is_some_and(|(k, _)| *k == id) {
            self.active = None;
        }
        if self.tracking.as_ref().is_some_and(|(k, _)| *k == id) {
            self.tracking = None;
        }
    }

    fn native(&self) -> Option<(Arc<dyn MsoComponentManager>, ComponentId)> {
        Some((self.original.clone()?, self.component_id?))
    }
}

/// Presents the components registered by one thread as a single component.
///
/// Toward the wrapped component manager the proxy is one `MsoComponent`, registered once no
/// matter how many local components it aggregates. Toward the local components it is an
/// `MsoComponentManager` handing out its own ids and fanning callbacks out to all of them.
///
/// The proxy is bound to the thread that created it. The last registration can only be revoked
/// natively from that thread.
pub struct ComponentManagerProxy {
    this: Weak<ComponentManagerProxy>,
    affinity: ThreadAffinity,
    state: Mutex<State>,
}

impl ComponentManagerProxy {
    /// Creates a proxy bound to the current thread.
    ///
    /// In general, use `ComponentManagerBroker::get_component_manager` instead.
    pub fn new(original: Arc<dyn MsoComponentManager>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            affinity: ThreadAffinity::current(),
            state: Mutex::new(State::new(original)),
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn as_component(&self) -> Result<Arc<dyn MsoComponent>> {
        let this: Arc<Self> = self.this.upgrade().ok_or(Error::Disposed)?;
        Ok(this)
    }

    fn is_self(&self, component: &Arc<dyn MsoComponent>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(component), self as *const Self)
    }

    fn components(&self) -> Vec<Arc<dyn MsoComponent>> {
        self.state().registry.components()
    }

    fn current(&self) -> Option<Arc<dyn MsoComponent>> {
        self.state().current()
    }

    fn original(&self) -> Option<Arc<dyn MsoComponentManager>> {
        self.state().original.clone()
    }

    #[inline]
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// The number of local registrations.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.state().ref_count
    }

    /// The id the wrapped manager assigned to this proxy.
    #[inline]
    pub fn component_id(&self) -> Option<ComponentId> {
        self.state().component_id
    }

    #[inline]
    pub fn active_component_id(&self) -> Option<ComponentId> {
        self.state().active.as_ref().map(|(id, _)| *id)
    }

    #[inline]
    pub fn tracking_component_id(&self) -> Option<ComponentId> {
        self.state().tracking.as_ref().map(|(id, _)| *id)
    }

    /// Local ids in registration order.
    #[inline]
    pub fn registered_ids(&self) -> Vec<ComponentId> {
        self.state().registry.ids()
    }

    /// Whether the wrapped manager has been released.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.state().original.is_none()
    }

    /// Revokes `id` from any thread.
    ///
    /// Unlike `revoke_component`, revoking the last registration from another thread succeeds:
    /// the registration is dropped locally and the proxy revokes itself from the wrapped manager
    /// during the next `continue_message_loop` on its own thread.
    #[inline]
    pub fn revoke_component_later(&self, id: ComponentId) -> Result<()> {
        self.revoke(id, true)
    }

    fn revoke(&self, id: ComponentId, defer: bool) -> Result<()> {
        let (original, last, native_id) = {
            let state = self.state();
            let original = state.original.clone().ok_or(Error::Disposed)?;
            if !state.registry.contains(id) {
                return Err(Error::NotRegistered(id));
            }
            (original, state.ref_count == 1, state.component_id)
        };
        let mut deferred = false;
        if last {
            if self.affinity.is_same_thread() {
                if let Some(native_id) = native_id {
                    original.revoke_component(native_id).inspect_err(|e| {
                        log::warn!("failed to revoke proxy {native_id}: {e}");
                    })?;
                    log::debug!("proxy {native_id} revoked");
                    self.state().component_id = None;
                }
            } else if defer && native_id.is_some() {
                log::debug!("revoke of proxy deferred to its own thread");
                deferred = true;
            } else if !defer {
                log::warn!("the last component {id} must be revoked on the proxy's thread");
                return Err(Error::WrongThread);
            }
        }
        drop(original);
        let (removed, dispose) = {
            let mut state = self.state();
            let removed = state.registry.remove(id);
            if removed.is_some() {
                state.ref_count = state.ref_count.saturating_sub(1);
            }
            state.forget(id);
            (removed, state.ref_count == 0 && !deferred)
        };
        drop(removed);
        if dispose {
            self.dispose();
        }
        Ok(())
    }

    /// Releases the wrapped manager and the registry, and clears the broker's cache.
    fn dispose(&self) {
        let (original, entries) = {
            let mut state = self.state();
            let Some(original) = state.original.take() else {
                return;
            };
            state.ref_count = 0;
            state.component_id = None;
            state.active = None;
            state.tracking = None;
            (original, state.registry.clear())
        };
        drop(entries);
        drop(original);
        log::debug!("component manager proxy disposed");
        if self.affinity.is_same_thread() {
            ComponentManagerBroker::release(self);
        } else {
            log::warn!("component manager proxy disposed on a foreign thread");
        }
    }

    /// Revokes the proxy from the wrapped manager if it is still registered.
    fn revoke_self(&self) -> bool {
        let Some((original, native_id)) = self.state().native() else {
            return false;
        };
        match original.revoke_component(native_id) {
            Ok(()) => {
                log::debug!("proxy {native_id} revoked");
                self.state().component_id = None;
                true
            }
            Err(e) => {
                log::warn!("failed to revoke proxy {native_id}: {e}");
                false
            }
        }
    }
}

impl std::fmt::Debug for ComponentManagerProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ComponentManagerProxy")
            .field("affinity", &self.affinity)
            .field("ref_count", &state.ref_count)
            .field("component_id", &state.component_id)
            .field("registered", &state.registry.len())
            .field("disposed", &state.original.is_none())
            .finish()
    }
}

impl MsoComponent for ComponentManagerProxy {
    fn debug_message(&self, instance: isize, msg: u32, wparam: usize, lparam: isize) -> bool {
        self.current()
            .is_some_and(|c| c.debug_message(instance, msg, wparam, lparam))
    }

    fn pre_translate_message(&self, msg: &mut Msg) -> bool {
        self.current().is_some_and(|c| c.pre_translate_message(msg))
    }

    fn on_enter_state(&self, state: StateId, enter: bool) {
        for component in self.components() {
            component.on_enter_state(state, enter);
        }
    }

    fn on_app_activate(&self, active: bool, other_thread_id: u32) {
        for component in self.components() {
            component.on_app_activate(active, other_thread_id);
        }
    }

    fn on_lose_activation(&self) {
        let active = self.state().active.as_ref().map(|(_, c)| c.clone());
        if let Some(active) = active {
            active.on_lose_activation();
        }
    }

    fn on_activation_change(
        &self,
        component: Option<&Arc<dyn MsoComponent>>,
        same_component: bool,
        info: Option<&ComponentRegistration>,
        host_is_activating: bool,
    ) {
        for c in self.components() {
            c.on_activation_change(component, same_component, info, host_is_activating);
        }
    }

    fn do_idle(&self, flags: IdleFlags) -> bool {
        let mut more = false;
        for component in self.components() {
            more |= component.do_idle(flags);
        }
        more
    }

    fn continue_message_loop(&self, reason: LoopReason, peeked: Option<&Msg>) -> bool {
        let pending = {
            let state = self.state();
            state.ref_count == 0 && state.component_id.is_some()
        };
        if pending && self.revoke_self() {
            let entries = self.state().registry.clear();
            drop(entries);
            self.dispose();
        }
        let mut cont = false;
        for component in self.components() {
            cont |= component.continue_message_loop(reason, peeked);
        }
        cont
    }

    fn query_terminate(&self, _prompt_user: bool) -> bool {
        true
    }

    fn terminate(&self) {
        for component in self.components() {
            component.terminate();
        }
        self.revoke_self();
        self.dispose();
    }

    fn window(&self, which: WindowKind) -> Option<WindowHandle> {
        self.current()?.window(which)
    }
}

impl MsoComponentManager for ComponentManagerProxy {
    fn query_service(&self, service: Guid, iid: Guid) -> Option<Service> {
        self.original()?.query_service(service, iid)
    }

    fn debug_message(&self, instance: isize, msg: u32, wparam: usize, lparam: isize) -> bool {
        self.original()
            .is_some_and(|m| m.debug_message(instance, msg, wparam, lparam))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, component, info)))]
    fn register_component(
        &self,
        component: Arc<dyn MsoComponent>,
        info: &ComponentRegistration,
    ) -> Result<ComponentId> {
        let first = {
            let state = self.state();
            let original = state.original.clone().ok_or(Error::Disposed)?;
            (state.ref_count == 0 && state.component_id.is_none()).then_some(original)
        };
        if let Some(original) = first {
            let native_id = original
                .register_component(self.as_component()?, info)
                .inspect_err(|e| log::warn!("failed to register proxy: {e}"))?;
            log::debug!("proxy registered as {native_id}");
            self.state().component_id = Some(native_id);
        }
        let mut state = self.state();
        let id = state.allocate_id()?;
        state.registry.insert(id, component);
        state.ref_count += 1;
        log::trace!("component {id} registered (ref_count = {})", state.ref_count);
        Ok(id)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    fn revoke_component(&self, id: ComponentId) -> Result<()> {
        self.revoke(id, false)
    }

    fn update_component_registration(
        &self,
        id: ComponentId,
        info: &ComponentRegistration,
    ) -> bool {
        let native = {
            let state = self.state();
            if !state.registry.contains(id) {
                return false;
            }
            state.native()
        };
        native.is_some_and(|(m, native_id)| m.update_component_registration(native_id, info))
    }

    fn on_component_activate(&self, id: ComponentId) -> bool {
        let (component, native) = {
            let state = self.state();
            (state.registry.get(id), state.native())
        };
        let (Some(component), Some((original, native_id))) = (component, native) else {
            return false;
        };
        if !original.on_component_activate(native_id) {
            return false;
        }
        self.state().active = Some((id, component));
        true
    }

    fn set_tracking_component(&self, id: ComponentId, track: bool) -> bool {
        let (component, native) = {
            let state = self.state();
            (state.registry.get(id), state.native())
        };
        let (Some(component), Some((original, native_id))) = (component, native) else {
            return false;
        };
        if !original.set_tracking_component(native_id, track) {
            return false;
        }
        self.state().tracking = track.then(|| (id, component));
        true
    }

    fn on_component_enter_state(
        &self,
        _id: ComponentId,
        state: StateId,
        context: StateContext,
        exclude: &[Arc<dyn MsoComponentManager>],
    ) {
        if context.includes_mine() {
            for component in self.components() {
                component.on_enter_state(state, true);
            }
        }
        let native = self.state().native();
        if let Some((original, native_id)) = native {
            original.on_component_enter_state(native_id, state, context, exclude);
        }
    }

    fn on_component_exit_state(
        &self,
        _id: ComponentId,
        state: StateId,
        context: StateContext,
        exclude: &[Arc<dyn MsoComponentManager>],
    ) -> bool {
        if context.includes_mine() {
            for component in self.components() {
                component.on_enter_state(state, false);
            }
        }
        let native = self.state().native();
        native.is_some_and(|(original, native_id)| {
            original.on_component_exit_state(native_id, state, context, exclude)
        })
    }

    fn in_state(&self, state: StateId) -> bool {
        self.original().is_some_and(|m| m.in_state(state))
    }

    fn continue_idle(&self) -> bool {
        self.original().is_some_and(|m| m.continue_idle())
    }

    fn push_message_loop(&self, id: ComponentId, reason: LoopReason) -> bool {
        let native = {
            let state = self.state();
            if !state.registry.contains(id) {
                return false;
            }
            state.native()
        };
        native.is_some_and(|(original, native_id)| original.push_message_loop(native_id, reason))
    }

    fn create_sub_component_manager(&self, iid: Guid) -> Option<Arc<dyn MsoComponentManager>> {
        self.original()?.create_sub_component_manager(iid)
    }

    fn get_parent_component_manager(&self) -> Option<Arc<dyn MsoComponentManager>> {
        self.original()?.get_parent_component_manager()
    }

    fn get_active_component(&self, which: ActiveComponentQuery) -> Option<Arc<dyn MsoComponent>> {
        let component = self.original()?.get_active_component(which)?;
        if !self.is_self(&component) {
            return Some(component);
        }
        let state = self.state();
        let local = match which {
            ActiveComponentQuery::Active => state.active.as_ref().map(|(_, c)| c.clone()),
            ActiveComponentQuery::Tracking => state.tracking.as_ref().map(|(_, c)| c.clone()),
            ActiveComponentQuery::TrackingOrActive => state.current(),
        };
        Some(local.unwrap_or(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    impl MsoComponent for Nop {
        fn pre_translate_message(&self, _msg: &mut Msg) -> bool {
            false
        }
        fn on_enter_state(&self, _state: StateId, _enter: bool) {}
        fn on_app_activate(&self, _active: bool, _other_thread_id: u32) {}
        fn do_idle(&self, _flags: IdleFlags) -> bool {
            false
        }
        fn continue_message_loop(&self, _reason: LoopReason, _peeked: Option<&Msg>) -> bool {
            true
        }
        fn terminate(&self) {}
        fn window(&self, _which: WindowKind) -> Option<WindowHandle> {
            None
        }
    }

    fn new_proxy() -> (Arc<StandardComponentManager>, Arc<ComponentManagerProxy>) {
        let manager = Arc::new(StandardComponentManager::with_pump(QueuePump::new()));
        let proxy = ComponentManagerProxy::new(manager.clone());
        (manager, proxy)
    }

    fn register(proxy: &ComponentManagerProxy) -> Result<ComponentId> {
        proxy.register_component(Arc::new(Nop), &ComponentRegistration::new())
    }

    #[test]
    fn ids_start_at_one() {
        let (manager, proxy) = new_proxy();
        assert_eq!(register(&proxy).unwrap(), ComponentId(1));
        assert_eq!(register(&proxy).unwrap(), ComponentId(2));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn ids_wrap_at_limit() {
        let (_manager, proxy) = new_proxy();
        let a = register(&proxy).unwrap();
        let b = register(&proxy).unwrap();
        let c = register(&proxy).unwrap();
        proxy.revoke_component(a).unwrap();
        proxy.revoke_component(b).unwrap();
        proxy.state().next_component_id = COMPONENT_ID_LIMIT - 1;
        assert_eq!(register(&proxy).unwrap(), ComponentId(1));
        assert_eq!(register(&proxy).unwrap(), ComponentId(2));
        assert_eq!(proxy.registered_ids(), vec![c, ComponentId(1), ComponentId(2)]);
    }

    #[test]
    fn wrapped_ids_skip_used_slots() {
        let (_manager, proxy) = new_proxy();
        let a = register(&proxy).unwrap();
        let _b = register(&proxy).unwrap();
        let _c = register(&proxy).unwrap();
        proxy.revoke_component(a).unwrap();
        proxy.state().next_component_id = 2;
        assert_eq!(register(&proxy).unwrap(), ComponentId(4));
        proxy.state().next_component_id = COMPONENT_ID_LIMIT - 1;
        assert_eq!(register(&proxy).unwrap(), ComponentId(1));
    }

    #[test]
    fn out_of_ids() {
        let (_manager, proxy) = new_proxy();
        proxy.state().id_limit = 4;
        let ids = (0..3).map(|_| register(&proxy).unwrap()).collect::<Vec<_>>();
        assert_eq!(ids, vec![ComponentId(1), ComponentId(2), ComponentId(3)]);
        assert!(matches!(register(&proxy), Err(Error::OutOfComponentIds)));
        assert_eq!(proxy.ref_count(), 3);
        proxy.revoke_component(ComponentId(2)).unwrap();
        assert_eq!(register(&proxy).unwrap(), ComponentId(2));
    }

    #[test]
    fn registry_size_matches_ref_count() {
        let (_manager, proxy) = new_proxy();
        let mut ids = vec![];
        for step in 0..20u32 {
            if step % 3 == 2 {
                let id = ids.remove(0);
                proxy.revoke_component(id).unwrap();
            } else {
                ids.push(register(&proxy).unwrap());
            }
            assert_eq!(proxy.registered_ids().len(), proxy.ref_count());
            assert_eq!(proxy.registered_ids(), ids);
        }
    }

    #[test]
    fn identity() {
        let (_manager, proxy) = new_proxy();
        let component: Arc<dyn MsoComponent> = proxy.clone();
        assert!(proxy.is_self(&component));
        let other: Arc<dyn MsoComponent> = Arc::new(Nop);
        assert!(!proxy.is_self(&other));
    }
}
