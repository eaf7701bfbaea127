use std::num::NonZeroIsize;

/// `WM_QUIT`.
pub const WM_QUIT: u32 = 0x0012;

/// Represents a native window handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowHandle(NonZeroIsize);

impl WindowHandle {
    /// Returns `None` for a null handle.
    #[inline]
    pub fn new(raw: isize) -> Option<Self> {
        NonZeroIsize::new(raw).map(Self)
    }

    #[inline]
    pub fn as_raw(&self) -> isize {
        self.0.get()
    }

    #[cfg(windows)]
    #[inline]
    pub fn as_hwnd(&self) -> windows::Win32::Foundation::HWND {
        windows::Win32::Foundation::HWND(self.0.get() as _)
    }

    #[cfg(windows)]
    #[inline]
    pub fn from_hwnd(hwnd: windows::Win32::Foundation::HWND) -> Option<Self> {
        Self::new(hwnd.0 as isize)
    }
}

impl From<WindowHandle> for raw_window_handle::RawWindowHandle {
    #[inline]
    fn from(value: WindowHandle) -> Self {
        raw_window_handle::RawWindowHandle::Win32(raw_window_handle::Win32WindowHandle::new(
            value.0,
        ))
    }
}

/// A native message, as queued by the OS.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Msg {
    pub hwnd: Option<WindowHandle>,
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
    pub time: u32,
    pub pt: (i32, i32),
}

impl Msg {
    #[inline]
    pub fn new(hwnd: Option<WindowHandle>, message: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            hwnd,
            message,
            wparam,
            lparam,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_quit(&self) -> bool {
        self.message == WM_QUIT
    }
}

#[cfg(windows)]
mod native {
    use super::*;
    use windows::Win32::{
        Foundation::{HWND, LPARAM, POINT, WPARAM},
        UI::WindowsAndMessaging::MSG,
    };

    impl From<MSG> for Msg {
        fn from(msg: MSG) -> Self {
            Self {
                hwnd: WindowHandle::from_hwnd(msg.hwnd),
                message: msg.message,
                wparam: msg.wParam.0,
                lparam: msg.lParam.0,
                time: msg.time,
                pt: (msg.pt.x, msg.pt.y),
            }
        }
    }

    impl From<&Msg> for MSG {
        fn from(msg: &Msg) -> Self {
            MSG {
                hwnd: msg.hwnd.map_or(HWND::default(), |h| h.as_hwnd()),
                message: msg.message,
                wParam: WPARAM(msg.wparam),
                lParam: LPARAM(msg.lparam),
                time: msg.time,
                pt: POINT {
                    x: msg.pt.0,
                    y: msg.pt.1,
                },
            }
        }
    }

    impl From<windows_core::GUID> for Guid {
        #[inline]
        fn from(guid: windows_core::GUID) -> Self {
            Self(guid.to_u128())
        }
    }
}

/// A 128-bit interface or service identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid(pub u128);

impl Guid {
    #[inline]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }
}

/// `IID_IMsoComponentManager`
pub const IID_COMPONENT_MANAGER: Guid = Guid::from_u128(0x000c0601_0000_0000_c000_000000000046);
/// `IID_IMsoComponent`
pub const IID_COMPONENT: Guid = Guid::from_u128(0x000c0600_0000_0000_c000_000000000046);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_window_handle() {
        assert!(WindowHandle::new(0).is_none());
        assert_eq!(WindowHandle::new(42).unwrap().as_raw(), 42);
    }

    #[test]
    fn raw_window_handle() {
        let handle = WindowHandle::new(0x1234).unwrap();
        let raw_window_handle::RawWindowHandle::Win32(raw) = handle.into() else {
            panic!("not a Win32 handle");
        };
        assert_eq!(raw.hwnd.get(), 0x1234);
        assert!(raw.hinstance.is_none());
    }

    #[test]
    fn quit_message() {
        assert!(Msg::new(None, WM_QUIT, 0, 0).is_quit());
        assert!(!Msg::new(None, 0x0100, 0, 0).is_quit());
    }
}
