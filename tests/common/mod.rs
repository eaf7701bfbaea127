#![allow(dead_code)]

use msocm::*;
use std::sync::atomic::{self, AtomicBool, AtomicU32};
use std::sync::{Arc, Mutex};

pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(vec![]))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A component writing every callback into a shared log.
pub struct RecordingComponent {
    pub name: &'static str,
    log: Log,
    pub wants_idle: AtomicBool,
    pub continues: AtomicBool,
    pub consumes: AtomicBool,
    pub window: Option<WindowHandle>,
    on_terminate: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl RecordingComponent {
    pub fn new(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: log.clone(),
            wants_idle: AtomicBool::new(false),
            continues: AtomicBool::new(true),
            consumes: AtomicBool::new(false),
            window: None,
            on_terminate: Mutex::new(None),
        })
    }

    pub fn with_window(name: &'static str, log: &Log, raw: isize) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: log.clone(),
            wants_idle: AtomicBool::new(false),
            continues: AtomicBool::new(true),
            consumes: AtomicBool::new(false),
            window: WindowHandle::new(raw),
            on_terminate: Mutex::new(None),
        })
    }

    pub fn set_on_terminate(&self, f: impl FnOnce() + Send + 'static) {
        *self.on_terminate.lock().unwrap() = Some(Box::new(f));
    }

    fn record(&self, s: impl AsRef<str>) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, s.as_ref()));
    }
}

impl MsoComponent for RecordingComponent {
    fn debug_message(&self, _instance: isize, msg: u32, _wparam: usize, _lparam: isize) -> bool {
        self.record(format!("debug {msg:#x}"));
        true
    }

    fn pre_translate_message(&self, msg: &mut Msg) -> bool {
        self.record(format!("pre_translate {:#x}", msg.message));
        self.consumes.load(atomic::Ordering::SeqCst)
    }

    fn on_enter_state(&self, state: StateId, enter: bool) {
        self.record(format!("enter {state:?} {enter}"));
    }

    fn on_app_activate(&self, active: bool, other_thread_id: u32) {
        self.record(format!("app_activate {active} {other_thread_id}"));
    }

    fn on_lose_activation(&self) {
        self.record("lose_activation");
    }

    fn on_activation_change(
        &self,
        _component: Option<&Arc<dyn MsoComponent>>,
        same_component: bool,
        _info: Option<&ComponentRegistration>,
        _host_is_activating: bool,
    ) {
        self.record(format!("activation_change {same_component}"));
    }

    fn do_idle(&self, _flags: IdleFlags) -> bool {
        self.record("idle");
        self.wants_idle.load(atomic::Ordering::SeqCst)
    }

    fn continue_message_loop(&self, reason: LoopReason, peeked: Option<&Msg>) -> bool {
        match peeked {
            Some(msg) => self.record(format!("continue {reason:?} {:#x}", msg.message)),
            None => self.record(format!("continue {reason:?} none")),
        }
        self.continues.load(atomic::Ordering::SeqCst)
    }

    fn terminate(&self) {
        self.record("terminate");
        let f = self.on_terminate.lock().unwrap().take();
        if let Some(f) = f {
            f();
        }
    }

    fn window(&self, _which: WindowKind) -> Option<WindowHandle> {
        self.window
    }
}

/// A stand-in for a host's component manager.
pub struct MockManager {
    calls: Mutex<Vec<String>>,
    next_id: AtomicU32,
    pub refuse_register: AtomicBool,
    pub refuse_revoke: AtomicBool,
    pub refuse_activate: AtomicBool,
    registered: Mutex<Option<Arc<dyn MsoComponent>>>,
    pub active: Mutex<Option<Arc<dyn MsoComponent>>>,
}

impl MockManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(vec![]),
            next_id: AtomicU32::new(100),
            refuse_register: AtomicBool::new(false),
            refuse_revoke: AtomicBool::new(false),
            refuse_activate: AtomicBool::new(false),
            registered: Mutex::new(None),
            active: Mutex::new(None),
        })
    }

    pub fn as_original(self: &Arc<Self>) -> Arc<dyn MsoComponentManager> {
        self.clone()
    }

    fn record(&self, s: impl Into<String>) {
        self.calls.lock().unwrap().push(s.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn registered(&self) -> Option<Arc<dyn MsoComponent>> {
        self.registered.lock().unwrap().clone()
    }
}

impl MsoComponentManager for MockManager {
    fn query_service(&self, _service: Guid, _iid: Guid) -> Option<Service> {
        self.record("query_service");
        Some(Arc::new(42u32))
    }

    fn debug_message(&self, _instance: isize, msg: u32, _wparam: usize, _lparam: isize) -> bool {
        self.record(format!("debug {msg:#x}"));
        true
    }

    fn register_component(
        &self,
        component: Arc<dyn MsoComponent>,
        _info: &ComponentRegistration,
    ) -> msocm::Result<ComponentId> {
        self.record("register");
        if self.refuse_register.load(atomic::Ordering::SeqCst) {
            return Err(Error::Refused);
        }
        *self.registered.lock().unwrap() = Some(component);
        Ok(ComponentId(self.next_id.fetch_add(1, atomic::Ordering::SeqCst)))
    }

    fn revoke_component(&self, id: ComponentId) -> msocm::Result<()> {
        self.record(format!("revoke {id}"));
        if self.refuse_revoke.load(atomic::Ordering::SeqCst) {
            return Err(Error::Refused);
        }
        let component = self.registered.lock().unwrap().take();
        drop(component);
        Ok(())
    }

    fn update_component_registration(
        &self,
        id: ComponentId,
        _info: &ComponentRegistration,
    ) -> bool {
        self.record(format!("update {id}"));
        true
    }

    fn on_component_activate(&self, id: ComponentId) -> bool {
        self.record(format!("activate {id}"));
        !self.refuse_activate.load(atomic::Ordering::SeqCst)
    }

    fn set_tracking_component(&self, id: ComponentId, track: bool) -> bool {
        self.record(format!("tracking {id} {track}"));
        true
    }

    fn on_component_enter_state(
        &self,
        id: ComponentId,
        state: StateId,
        context: StateContext,
        _exclude: &[Arc<dyn MsoComponentManager>],
    ) {
        self.record(format!("enter_state {id} {state:?} {context:?}"));
    }

    fn on_component_exit_state(
        &self,
        id: ComponentId,
        state: StateId,
        context: StateContext,
        _exclude: &[Arc<dyn MsoComponentManager>],
    ) -> bool {
        self.record(format!("exit_state {id} {state:?} {context:?}"));
        true
    }

    fn in_state(&self, _state: StateId) -> bool {
        true
    }

    fn continue_idle(&self) -> bool {
        true
    }

    fn push_message_loop(&self, id: ComponentId, reason: LoopReason) -> bool {
        self.record(format!("push {id} {reason:?}"));
        true
    }

    fn create_sub_component_manager(&self, _iid: Guid) -> Option<Arc<dyn MsoComponentManager>> {
        None
    }

    fn get_parent_component_manager(&self) -> Option<Arc<dyn MsoComponentManager>> {
        None
    }

    fn get_active_component(&self, _which: ActiveComponentQuery) -> Option<Arc<dyn MsoComponent>> {
        let active = self.active.lock().unwrap().clone();
        active.or_else(|| self.registered())
    }
}
