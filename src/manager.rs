use crate::*;
use std::any::Any;
use std::sync::Arc;

/// A service object returned by `MsoComponentManager::query_service`.
pub type Service = Arc<dyn Any + Send + Sync>;

/// The authority owning a message loop (`IMsoComponentManager`).
///
/// Components register with it and are notified of idle time, state changes and activation.
pub trait MsoComponentManager: Send + Sync {
    fn query_service(&self, service: Guid, iid: Guid) -> Option<Service>;

    fn debug_message(&self, instance: isize, msg: u32, wparam: usize, lparam: isize) -> bool;

    /// Registers `component` and returns its id.
    fn register_component(
        &self,
        component: Arc<dyn MsoComponent>,
        info: &ComponentRegistration,
    ) -> Result<ComponentId>;

    /// Revokes a registration.
    fn revoke_component(&self, id: ComponentId) -> Result<()>;

    fn update_component_registration(&self, id: ComponentId, info: &ComponentRegistration)
    -> bool;

    /// Makes `id` the active component.
    fn on_component_activate(&self, id: ComponentId) -> bool;

    /// Makes `id` the tracking component (`track == true`) or stops tracking.
    ///
    /// The tracking component takes precedence over the active one for message routing.
    fn set_tracking_component(&self, id: ComponentId, track: bool) -> bool;

    /// Notifies that `id` enters `state`.
    ///
    /// Managers in `exclude` are not notified.
    fn on_component_enter_state(
        &self,
        id: ComponentId,
        state: StateId,
        context: StateContext,
        exclude: &[Arc<dyn MsoComponentManager>],
    );

    /// Notifies that `id` exits `state`. Returns `true` when the state context is still in `state`.
    fn on_component_exit_state(
        &self,
        id: ComponentId,
        state: StateId,
        context: StateContext,
        exclude: &[Arc<dyn MsoComponentManager>],
    ) -> bool;

    fn in_state(&self, state: StateId) -> bool;

    /// Called during idle processing. Returns `false` when idle work should stop.
    fn continue_idle(&self) -> bool;

    /// Runs a message loop on behalf of `id` until `MsoComponent::continue_message_loop` returns
    /// `false`.
    fn push_message_loop(&self, id: ComponentId, reason: LoopReason) -> bool;

    fn create_sub_component_manager(&self, iid: Guid) -> Option<Arc<dyn MsoComponentManager>>;

    fn get_parent_component_manager(&self) -> Option<Arc<dyn MsoComponentManager>>;

    fn get_active_component(&self, which: ActiveComponentQuery) -> Option<Arc<dyn MsoComponent>>;
}

/// Conversion of a manager handle into a callable manager reference.
pub trait IntoComponentManager {
    fn into_component_manager(self) -> Result<Arc<dyn MsoComponentManager>>;
}

impl IntoComponentManager for Arc<dyn MsoComponentManager> {
    #[inline]
    fn into_component_manager(self) -> Result<Arc<dyn MsoComponentManager>> {
        Ok(self)
    }
}

impl IntoComponentManager for &Arc<dyn MsoComponentManager> {
    #[inline]
    fn into_component_manager(self) -> Result<Arc<dyn MsoComponentManager>> {
        Ok(self.clone())
    }
}

impl IntoComponentManager for Option<Arc<dyn MsoComponentManager>> {
    #[inline]
    fn into_component_manager(self) -> Result<Arc<dyn MsoComponentManager>> {
        self.ok_or(Error::InvalidArgument("component manager is null"))
    }
}
