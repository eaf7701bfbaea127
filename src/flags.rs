use crate::*;

bitflags::bitflags! {
    /// Registration flags (`msocrf*`).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RegistrationFlags: u32 {
        const NEED_IDLE_TIME = 1;
        const NEED_PERIODIC_IDLE_TIME = 2;
        const PRE_TRANSLATE_KEYS = 4;
        const PRE_TRANSLATE_ALL = 8;
        const NEED_SPEC_ACTIVE_NOTIFS = 16;
        const NEED_ALL_ACTIVE_NOTIFS = 32;
        const EXCLUSIVE_BORDER_SPACE = 64;
        const EXCLUSIVE_ACTIVATION = 128;
        const NEED_ALL_MAC_EVENTS = 256;
        const MASTER = 512;
    }
}

bitflags::bitflags! {
    /// Advise flags (`msocadvf*`), one bit per `StateId`.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AdviseFlags: u32 {
        const MODAL = 1;
        const REDRAW_OFF = 2;
        const WARNINGS_OFF = 4;
        const RECORDING = 8;
    }
}

impl From<StateId> for AdviseFlags {
    #[inline]
    fn from(value: StateId) -> Self {
        match value {
            StateId::Modal => Self::MODAL,
            StateId::RedrawOff => Self::REDRAW_OFF,
            StateId::WarningsOff => Self::WARNINGS_OFF,
            StateId::Recording => Self::RECORDING,
        }
    }
}

bitflags::bitflags! {
    /// Idle flags (`msoidlef*`) passed to `MsoComponent::do_idle`.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct IdleFlags: u32 {
        const PERIODIC = 1;
        const NON_PERIODIC = 2;
        const PRIORITY = 4;
        /// Every bit set (`msoidlefAll`).
        const ALL = u32::MAX;
    }
}

/// Registration info of a component (`MSOCRINFO`).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentRegistration {
    /// Milliseconds between periodic idle calls when `NEED_PERIODIC_IDLE_TIME` is set.
    pub idle_time_interval: u32,
    pub flags: RegistrationFlags,
    pub advise: AdviseFlags,
}

impl ComponentRegistration {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn need_idle_time(mut self, flag: bool) -> Self {
        self.flags.set(RegistrationFlags::NEED_IDLE_TIME, flag);
        self
    }

    #[inline]
    pub fn periodic_idle_time(mut self, interval: Option<u32>) -> Self {
        self.flags
            .set(RegistrationFlags::NEED_PERIODIC_IDLE_TIME, interval.is_some());
        self.idle_time_interval = interval.unwrap_or(0);
        self
    }

    #[inline]
    pub fn pre_translate_keys(mut self, flag: bool) -> Self {
        self.flags.set(RegistrationFlags::PRE_TRANSLATE_KEYS, flag);
        self
    }

    #[inline]
    pub fn pre_translate_all(mut self, flag: bool) -> Self {
        self.flags.set(RegistrationFlags::PRE_TRANSLATE_ALL, flag);
        self
    }

    #[inline]
    pub fn flags(mut self, flags: RegistrationFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn advise(mut self, advise: AdviseFlags) -> Self {
        self.advise |= advise;
        self
    }

    /// Whether the component wants `do_idle` calls.
    #[inline]
    pub fn wants_idle_time(&self) -> bool {
        self.flags.intersects(
            RegistrationFlags::NEED_IDLE_TIME | RegistrationFlags::NEED_PERIODIC_IDLE_TIME,
        )
    }
}
