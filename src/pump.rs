use crate::*;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A source of messages drained by `StandardComponentManager::push_message_loop`.
pub trait MessagePump: Send + Sync {
    /// Returns the next message without removing it.
    fn peek(&self) -> Option<Msg>;

    /// Removes and returns the next message.
    fn get(&self) -> Option<Msg>;

    fn translate_and_dispatch(&self, msg: &Msg);

    /// Blocks until a new message arrives.
    fn wait(&self);

    /// Posts `WM_QUIT` with `exit_code`.
    fn post_quit(&self, exit_code: i32);
}

/// The message queue of the calling thread.
#[cfg(windows)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32MessagePump;

#[cfg(windows)]
impl Win32MessagePump {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl MessagePump for Win32MessagePump {
    fn peek(&self) -> Option<Msg> {
        use windows::Win32::UI::WindowsAndMessaging::{MSG, PM_NOREMOVE, PeekMessageW};
        let mut msg = MSG::default();
        unsafe {
            PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE)
                .as_bool()
                .then(|| msg.into())
        }
    }

    fn get(&self) -> Option<Msg> {
        use windows::Win32::UI::WindowsAndMessaging::{GetMessageW, MSG};
        let mut msg = MSG::default();
        unsafe {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if ret.0 == -1 {
                log::error!("GetMessageW: {}", Error::from_win32());
                return None;
            }
        }
        Some(msg.into())
    }

    fn translate_and_dispatch(&self, msg: &Msg) {
        use windows::Win32::UI::WindowsAndMessaging::{DispatchMessageW, MSG, TranslateMessage};
        let msg = MSG::from(msg);
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    fn wait(&self) {
        unsafe {
            if let Err(e) = windows::Win32::UI::WindowsAndMessaging::WaitMessage() {
                log::error!("WaitMessage: {e}");
            }
        }
    }

    fn post_quit(&self, exit_code: i32) {
        unsafe {
            windows::Win32::UI::WindowsAndMessaging::PostQuitMessage(exit_code);
        }
    }
}

type Dispatcher = Box<dyn Fn(&Msg) + Send + Sync>;

/// An in-memory message queue.
///
/// Messages are posted with `post` and handed to the dispatcher when the loop dispatches them.
/// `wait` returns immediately; a loop on an empty queue keeps idling until a component ends it.
pub struct QueuePump {
    queue: Mutex<VecDeque<Msg>>,
    dispatcher: Dispatcher,
}

impl QueuePump {
    #[inline]
    pub fn new() -> Self {
        Self::with_dispatcher(|_| {})
    }

    #[inline]
    pub fn with_dispatcher(f: impl Fn(&Msg) + Send + Sync + 'static) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            dispatcher: Box::new(f),
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Msg>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn post(&self, msg: Msg) {
        self.queue().push_back(msg);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }
}

impl Default for QueuePump {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePump for QueuePump {
    fn peek(&self) -> Option<Msg> {
        self.queue().front().copied()
    }

    fn get(&self) -> Option<Msg> {
        self.queue().pop_front()
    }

    fn translate_and_dispatch(&self, msg: &Msg) {
        (self.dispatcher)(msg);
    }

    fn wait(&self) {}

    fn post_quit(&self, exit_code: i32) {
        self.post(Msg::new(None, WM_QUIT, exit_code as usize, 0));
    }
}

impl<T: MessagePump + ?Sized> MessagePump for std::sync::Arc<T> {
    #[inline]
    fn peek(&self) -> Option<Msg> {
        (**self).peek()
    }

    #[inline]
    fn get(&self) -> Option<Msg> {
        (**self).get()
    }

    #[inline]
    fn translate_and_dispatch(&self, msg: &Msg) {
        (**self).translate_and_dispatch(msg)
    }

    #[inline]
    fn wait(&self) {
        (**self).wait()
    }

    #[inline]
    fn post_quit(&self, exit_code: i32) {
        (**self).post_quit(exit_code)
    }
}
