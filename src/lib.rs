#![allow(clippy::needless_doctest_main)]

//! Per-thread component manager proxy for Win32 message loop participants
//!
//! A component manager (`IMsoComponentManager`) owns a thread's message loop and is thread-affine.
//! This crate lets any number of components on one thread share a single registration with it:
//!
//! - [`ComponentManagerProxy`] registers itself once with the wrapped manager and fans the
//!   manager's callbacks out to every local component.
//! - [`ComponentManagerBroker`] hands out exactly one proxy per thread.
//! - [`StandardComponentManager`] is a manager of its own, for threads not hosted by another
//!   application.
//!
//! # Simple example
//!
//! ```
//! use std::sync::Arc;
//! use msocm::*;
//!
//! struct Component;
//!
//! impl MsoComponent for Component {
//!     fn pre_translate_message(&self, _msg: &mut Msg) -> bool { false }
//!     fn on_enter_state(&self, _state: StateId, _enter: bool) {}
//!     fn on_app_activate(&self, _active: bool, _other_thread_id: u32) {}
//!     fn do_idle(&self, _flags: IdleFlags) -> bool { false }
//!     fn continue_message_loop(&self, _reason: LoopReason, _peeked: Option<&Msg>) -> bool {
//!         false
//!     }
//!     fn terminate(&self) {}
//!     fn window(&self, _which: WindowKind) -> Option<WindowHandle> { None }
//! }
//!
//! fn main() -> msocm::Result<()> {
//!     let original: Arc<dyn MsoComponentManager> =
//!         Arc::new(StandardComponentManager::with_pump(QueuePump::new()));
//!     let manager = ComponentManagerBroker::get_component_manager(original)?;
//!     let id = manager.register_component(Arc::new(Component), &ComponentRegistration::new())?;
//!     manager.on_component_activate(id);
//!     manager.revoke_component(id)?;
//!     assert!(manager.is_disposed());
//!     Ok(())
//! }
//! ```
//!
//! # Note
//! A proxy must be driven from the thread that created it. Revoking the last registration from
//! another thread fails with [`Error::WrongThread`].
//!

mod affinity;
mod broker;
mod codes;
mod component;
mod error;
mod flags;
mod manager;
mod message;
mod proxy;
mod pump;
mod standard;

pub use affinity::*;
pub use broker::*;
pub use codes::*;
pub use component::*;
pub use error::*;
pub use flags::*;
pub use manager::*;
pub use message::*;
pub use proxy::*;
pub use pump::*;
pub use standard::*;

#[cfg(windows)]
pub mod api {
    pub use windows::*;
}
