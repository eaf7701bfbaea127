use crate::*;
use std::sync::Arc;

/// An identifier handed out by a component manager on registration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(pub u32);

impl std::fmt::Display for ComponentId {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant in a shared message loop (`IMsoComponent`).
///
/// The component manager calls these methods from the thread running the loop.
pub trait MsoComponent: Send + Sync {
    /// Debug hook. Returns `true` when the message was handled.
    fn debug_message(&self, instance: isize, msg: u32, wparam: usize, lparam: isize) -> bool {
        let _ = (instance, msg, wparam, lparam);
        false
    }

    /// Gives the component a chance to process `msg` before it is translated and dispatched.
    ///
    /// Returns `true` when the message was consumed.
    fn pre_translate_message(&self, msg: &mut Msg) -> bool;

    /// Notifies that the app enters (`enter == true`) or exits `state`.
    fn on_enter_state(&self, state: StateId, enter: bool);

    /// Notifies that the app is activated or deactivated.
    ///
    /// `other_thread_id` is the thread on the other side of the change.
    fn on_app_activate(&self, active: bool, other_thread_id: u32);

    /// Notifies that the component lost the activation.
    fn on_lose_activation(&self) {}

    /// Notifies that `component` is becoming active.
    fn on_activation_change(
        &self,
        component: Option<&Arc<dyn MsoComponent>>,
        same_component: bool,
        info: Option<&ComponentRegistration>,
        host_is_activating: bool,
    ) {
        let _ = (component, same_component, info, host_is_activating);
    }

    /// Performs idle work. Returns `true` when more idle time is wanted.
    fn do_idle(&self, flags: IdleFlags) -> bool;

    /// Asks whether a message loop pushed by this component should keep running.
    ///
    /// `peeked` is the next message in the queue, or `None` when the queue is empty.
    fn continue_message_loop(&self, reason: LoopReason, peeked: Option<&Msg>) -> bool;

    /// Returns `false` to veto termination.
    fn query_terminate(&self, prompt_user: bool) -> bool {
        let _ = prompt_user;
        true
    }

    /// Asks the component to revoke its registration and release its resources.
    fn terminate(&self);

    /// Returns a window associated with the component.
    fn window(&self, which: WindowKind) -> Option<WindowHandle>;
}

/// Pointer identity of two components.
#[inline]
pub fn same_component(a: &Arc<dyn MsoComponent>, b: &Arc<dyn MsoComponent>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
