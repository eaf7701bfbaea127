use crate::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Entry {
    component: Arc<dyn MsoComponent>,
    info: ComponentRegistration,
}

#[derive(Default)]
struct State {
    components: BTreeMap<ComponentId, Entry>,
    cookie: u32,
    active: Option<ComponentId>,
    tracking: Option<ComponentId>,
    current_state: AdviseFlags,
}

impl State {
    fn component(&self, id: Option<ComponentId>) -> Option<Arc<dyn MsoComponent>> {
        self.components.get(&id?).map(|e| e.component.clone())
    }

    fn snapshot(&self) -> Vec<(Arc<dyn MsoComponent>, ComponentRegistration)> {
        self.components
            .values()
            .map(|e| (e.component.clone(), e.info.clone()))
            .collect()
    }
}

/// A component manager for threads that are not hosted by another application.
///
/// It keeps the registered components, tracks the active and tracking component, and runs
/// message loops on a `MessagePump`.
pub struct StandardComponentManager {
    state: Mutex<State>,
    pump: Box<dyn MessagePump>,
}

impl StandardComponentManager {
    /// Creates a manager pumping the calling thread's Win32 message queue.
    #[cfg(windows)]
    #[inline]
    pub fn new() -> Self {
        Self::with_pump(Win32MessagePump::new())
    }

    #[inline]
    pub fn with_pump(pump: impl MessagePump + 'static) -> Self {
        Self {
            state: Mutex::new(State::default()),
            pump: Box::new(pump),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.state().components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state().components.is_empty()
    }

    #[inline]
    pub fn registration(&self, id: ComponentId) -> Option<ComponentRegistration> {
        self.state().components.get(&id).map(|e| e.info.clone())
    }

    #[inline]
    pub fn active_component_id(&self) -> Option<ComponentId> {
        self.state().active
    }

    #[inline]
    pub fn tracking_component_id(&self) -> Option<ComponentId> {
        self.state().tracking
    }

    fn broadcast_state(&self, state: StateId, enter: bool) {
        let components = self.state().snapshot();
        for (component, _) in components {
            component.on_enter_state(state, enter);
        }
    }

    /// Gives idle time to the components asking for it. Returns `true` when any wants more.
    fn do_idle(&self) -> bool {
        let components = self.state().snapshot();
        let mut more = false;
        for (component, info) in components {
            if !info.wants_idle_time() {
                continue;
            }
            more |= component.do_idle(IdleFlags::ALL);
            if !self.continue_idle() {
                break;
            }
        }
        more
    }
}

impl MsoComponentManager for StandardComponentManager {
    fn query_service(&self, _service: Guid, _iid: Guid) -> Option<Service> {
        None
    }

    fn debug_message(&self, _instance: isize, _msg: u32, _wparam: usize, _lparam: isize) -> bool {
        true
    }

    fn register_component(
        &self,
        component: Arc<dyn MsoComponent>,
        info: &ComponentRegistration,
    ) -> Result<ComponentId> {
        let mut state = self.state();
        state.cookie = state
            .cookie
            .checked_add(1)
            .ok_or(Error::OutOfComponentIds)?;
        let id = ComponentId(state.cookie);
        state.components.insert(
            id,
            Entry {
                component,
                info: info.clone(),
            },
        );
        log::debug!("component {id} registered");
        Ok(id)
    }

    fn revoke_component(&self, id: ComponentId) -> Result<()> {
        let entry = {
            let mut state = self.state();
            let entry = state
                .components
                .remove(&id)
                .ok_or(Error::NotRegistered(id))?;
            if state.active == Some(id) {
                state.active = None;
            }
            if state.tracking == Some(id) {
                state.tracking = None;
            }
            entry
        };
        drop(entry);
        log::debug!("component {id} revoked");
        Ok(())
    }

    fn update_component_registration(
        &self,
        id: ComponentId,
        info: &ComponentRegistration,
    ) -> bool {
        let mut state = self.state();
        let Some(entry) = state.components.get_mut(&id) else {
            return false;
        };
        entry.info = info.clone();
        true
    }

    fn on_component_activate(&self, id: ComponentId) -> bool {
        let (component, info, previous, observers) = {
            let mut state = self.state();
            let Some(entry) = state.components.get(&id) else {
                return false;
            };
            let component = entry.component.clone();
            let info = entry.info.clone();
            let previous = state.active.replace(id);
            if previous == Some(id) {
                return true;
            }
            let observers = state
                .components
                .values()
                .filter(|e| {
                    e.info
                        .flags
                        .contains(RegistrationFlags::NEED_ALL_ACTIVE_NOTIFS)
                })
                .map(|e| e.component.clone())
                .collect::<Vec<_>>();
            (component, info, state.component(previous), observers)
        };
        if let Some(previous) = previous {
            previous.on_lose_activation();
        }
        for observer in observers {
            let same = same_component(&observer, &component);
            observer.on_activation_change(Some(&component), same, Some(&info), false);
        }
        true
    }

    fn set_tracking_component(&self, id: ComponentId, track: bool) -> bool {
        let mut state = self.state();
        if !state.components.contains_key(&id) {
            return false;
        }
        let is_tracking = state.tracking == Some(id);
        if is_tracking == track {
            return false;
        }
        state.tracking = track.then_some(id);
        true
    }

    fn on_component_enter_state(
        &self,
        _id: ComponentId,
        state: StateId,
        context: StateContext,
        _exclude: &[Arc<dyn MsoComponentManager>],
    ) {
        self.state().current_state |= state.into();
        if context.includes_mine() {
            self.broadcast_state(state, true);
        }
    }

    fn on_component_exit_state(
        &self,
        _id: ComponentId,
        state: StateId,
        context: StateContext,
        _exclude: &[Arc<dyn MsoComponentManager>],
    ) -> bool {
        self.state().current_state -= state.into();
        if context.includes_mine() {
            self.broadcast_state(state, false);
        }
        self.in_state(state)
    }

    fn in_state(&self, state: StateId) -> bool {
        self.state().current_state.contains(state.into())
    }

    fn continue_idle(&self) -> bool {
        self.pump.peek().is_none()
    }

    fn push_message_loop(&self, id: ComponentId, reason: LoopReason) -> bool {
        let Some(component) = self.state().component(Some(id)) else {
            return false;
        };
        log::debug!("push message loop: {reason:?}");
        loop {
            if let Some(peeked) = self.pump.peek() {
                if !component.continue_message_loop(reason, Some(&peeked)) {
                    break;
                }
                let Some(mut msg) = self.pump.get() else {
                    break;
                };
                if msg.is_quit() {
                    if reason != LoopReason::Main {
                        self.pump.post_quit(msg.wparam as i32);
                    }
                    break;
                }
                let target = {
                    let state = self.state();
                    state.component(state.tracking.or(state.active))
                };
                let consumed = target.is_some_and(|c| c.pre_translate_message(&mut msg));
                if !consumed {
                    self.pump.translate_and_dispatch(&msg);
                }
            } else {
                if reason.is_do_events() {
                    break;
                }
                let more_idle = self.do_idle();
                if !component.continue_message_loop(reason, None) {
                    break;
                }
                // A peek during idle marks queued messages as seen, so WaitMessage would block.
                if !more_idle && self.pump.peek().is_none() {
                    self.pump.wait();
                }
            }
        }
        log::debug!("pop message loop: {reason:?}");
        true
    }

    fn create_sub_component_manager(&self, _iid: Guid) -> Option<Arc<dyn MsoComponentManager>> {
        None
    }

    fn get_parent_component_manager(&self) -> Option<Arc<dyn MsoComponentManager>> {
        None
    }

    fn get_active_component(&self, which: ActiveComponentQuery) -> Option<Arc<dyn MsoComponent>> {
        let state = self.state();
        let id = match which {
            ActiveComponentQuery::Active => state.active,
            ActiveComponentQuery::Tracking => state.tracking,
            ActiveComponentQuery::TrackingOrActive => state.tracking.or(state.active),
        };
        state.component(id)
    }
}
