use crate::*;

/// State ids (`msocstate*`) passed to enter/exit state notifications.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum StateId {
    /// Top-level windows should be disabled while the app is modal.
    Modal = 1,
    RedrawOff = 2,
    WarningsOff = 3,
    Recording = 4,
}

impl TryFrom<i32> for StateId {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Self::Modal),
            2 => Ok(Self::RedrawOff),
            3 => Ok(Self::WarningsOff),
            4 => Ok(Self::Recording),
            _ => Err(Error::InvalidArgument("state id")),
        }
    }
}

/// State contexts (`msoccontext*`): which components a state change affects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum StateContext {
    All = 0,
    Mine = 1,
    Others = 2,
}

impl StateContext {
    /// Whether components registered with the notified manager are affected.
    #[inline]
    pub fn includes_mine(&self) -> bool {
        matches!(self, Self::All | Self::Mine)
    }
}

impl TryFrom<i32> for StateContext {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::All),
            1 => Ok(Self::Mine),
            2 => Ok(Self::Others),
            _ => Err(Error::InvalidArgument("state context")),
        }
    }
}

/// Reasons for pushing a message loop (`msoloop*`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum LoopReason {
    DoEventsModal = -2,
    Main = -1,
    FocusWait = 1,
    DoEvents = 2,
    Debug = 3,
    ModalForm = 4,
    ModalAlert = 5,
}

impl LoopReason {
    #[inline]
    pub fn is_do_events(&self) -> bool {
        matches!(self, Self::DoEvents | Self::DoEventsModal)
    }
}

impl TryFrom<i32> for LoopReason {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -2 => Ok(Self::DoEventsModal),
            -1 => Ok(Self::Main),
            1 => Ok(Self::FocusWait),
            2 => Ok(Self::DoEvents),
            3 => Ok(Self::Debug),
            4 => Ok(Self::ModalForm),
            5 => Ok(Self::ModalAlert),
            _ => Err(Error::InvalidArgument("loop reason")),
        }
    }
}

/// Which component `get_active_component` asks for (`msogac*`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ActiveComponentQuery {
    Active = 0,
    Tracking = 1,
    TrackingOrActive = 2,
}

/// Windows a component can be asked for (`msocWindow*`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum WindowKind {
    FrameToplevel = 0,
    FrameOwner = 1,
    Component = 2,
    DlgOwner = 3,
}
