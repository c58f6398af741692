//! Bunch flag set.

/// Flags carried in a bunch header.
///
/// The bits are a local representation; on the wire each flag is a single
/// bit and some are only present when another flag is set (see
/// [`is_valid`](Self::is_valid)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BunchFlags(u16);

impl BunchFlags {
    /// Bunch targets a control channel.
    pub const CONTROL: u16 = 1 << 0;
    /// Bunch opens its channel. Only encoded for control bunches.
    pub const OPEN: u16 = 1 << 1;
    /// Bunch closes its channel. Only encoded for control bunches.
    pub const CLOSE: u16 = 1 << 2;
    /// Replication on the channel is paused.
    pub const REPLICATION_PAUSED: u16 = 1 << 3;
    /// Bunch is reliable and carries a channel sequence.
    pub const RELIABLE: u16 = 1 << 4;
    /// Payload starts with package map exports.
    pub const HAS_PACKAGE_MAP_EXPORTS: u16 = 1 << 5;
    /// Payload references GUIDs that must be mapped first.
    pub const HAS_MUST_BE_MAPPED_GUIDS: u16 = 1 << 6;
    /// Bunch is one piece of a larger message.
    pub const PARTIAL: u16 = 1 << 7;
    /// First piece of a partial message.
    pub const PARTIAL_INITIAL: u16 = 1 << 8;
    /// Last piece of a partial message.
    pub const PARTIAL_FINAL: u16 = 1 << 9;

    const RESERVED_MASK: u16 = !0x03FF;

    /// Creates flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns a copy with `flag` set.
    #[must_use]
    pub const fn with(self, flag: u16) -> Self {
        Self(self.0 | flag)
    }

    /// Returns a copy with `flag` set to `value`.
    #[must_use]
    pub const fn set(self, flag: u16, value: bool) -> Self {
        if value {
            Self(self.0 | flag)
        } else {
            Self(self.0 & !flag)
        }
    }

    /// Returns `true` if every bit of `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    /// Returns `true` for a control bunch, which carries open and close bits.
    #[must_use]
    pub const fn is_control(self) -> bool {
        self.contains(Self::CONTROL)
    }

    /// Returns `true` if the bunch opens its channel.
    #[must_use]
    pub const fn is_open(self) -> bool {
        self.contains(Self::OPEN)
    }

    /// Returns `true` if the bunch closes its channel.
    #[must_use]
    pub const fn is_close(self) -> bool {
        self.contains(Self::CLOSE)
    }

    /// Returns `true` if replication is paused on the channel.
    #[must_use]
    pub const fn is_replication_paused(self) -> bool {
        self.contains(Self::REPLICATION_PAUSED)
    }

    /// Returns `true` if the bunch carries a channel sequence.
    #[must_use]
    pub const fn is_reliable(self) -> bool {
        self.contains(Self::RELIABLE)
    }

    /// Returns `true` if the payload starts with package map exports.
    #[must_use]
    pub const fn has_package_map_exports(self) -> bool {
        self.contains(Self::HAS_PACKAGE_MAP_EXPORTS)
    }

    /// Returns `true` if the payload lists GUIDs that must be mapped first.
    #[must_use]
    pub const fn has_must_be_mapped_guids(self) -> bool {
        self.contains(Self::HAS_MUST_BE_MAPPED_GUIDS)
    }

    /// Returns `true` if the bunch is one piece of a split payload.
    #[must_use]
    pub const fn is_partial(self) -> bool {
        self.contains(Self::PARTIAL)
    }

    /// Returns `true` for the first piece of a partial bunch.
    #[must_use]
    pub const fn is_partial_initial(self) -> bool {
        self.contains(Self::PARTIAL_INITIAL)
    }

    /// Returns `true` for the last piece of a partial bunch.
    #[must_use]
    pub const fn is_partial_final(self) -> bool {
        self.contains(Self::PARTIAL_FINAL)
    }

    /// Returns `true` if the bunch header carries a channel name.
    #[must_use]
    pub const fn has_channel_name(self) -> bool {
        self.is_open() || self.is_reliable()
    }

    /// Returns `true` if the flags can be represented on the wire.
    ///
    /// Open/close require control, the partial markers require partial, and
    /// no reserved bits may be set.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        if self.0 & Self::RESERVED_MASK != 0 {
            return false;
        }
        if (self.is_open() || self.is_close()) && !self.is_control() {
            return false;
        }
        if (self.is_partial_initial() || self.is_partial_final()) && !self.is_partial() {
            return false;
        }
        true
    }

    /// Flags for a reliable bunch that opens the control channel.
    #[must_use]
    pub const fn reliable_control_open() -> Self {
        Self(Self::CONTROL | Self::OPEN | Self::RELIABLE)
    }

    /// Flags for a reliable bunch on an already open channel.
    #[must_use]
    pub const fn reliable() -> Self {
        Self(Self::RELIABLE)
    }

    /// Flags for the first piece of a partial bunch that opens a control channel.
    #[must_use]
    pub const fn partial_control_open() -> Self {
        Self(Self::CONTROL | Self::OPEN | Self::PARTIAL | Self::PARTIAL_INITIAL)
    }
}
