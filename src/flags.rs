use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Transactional state bits carried by every indexed/time-series event.
    ///
    /// Bit layout (`spec.md` section 3.3):
    ///
    /// ```text
    ///  bit  name
    ///   0   TX_PENDING
    ///   1   REMOVE_EVENT
    ///   2   SNAPSHOT_BEGIN
    ///   3   SNAPSHOT_END
    ///   4   SNAPSHOT_SNIP
    ///   5   (reserved)
    ///   6   SNAPSHOT_MODE
    ///   7   REMOVE_SYMBOL
    /// ```
    ///
    /// Bit 5 is reserved so the mask keeps fitting in one byte on the wire; it must be
    /// preserved, not cleared, on decode/encode round-trips.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct EventFlags: u8 {
        const TX_PENDING    = 0b0000_0001;
        const REMOVE_EVENT  = 0b0000_0010;
        const SNAPSHOT_BEGIN = 0b0000_0100;
        const SNAPSHOT_END  = 0b0000_1000;
        const SNAPSHOT_SNIP = 0b0001_0000;
        const SNAPSHOT_MODE = 0b0100_0000;
        const REMOVE_SYMBOL = 0b1000_0000;
    }
}

impl EventFlags {
    /// `true` exactly when the last event of a snapshot load has arrived, i.e. either
    /// `SNAPSHOT_END` or `SNAPSHOT_SNIP` is set.
    pub fn ends_snapshot(self) -> bool {
        self.intersects(Self::SNAPSHOT_END | Self::SNAPSHOT_SNIP)
    }

    pub fn tx_pending(self) -> bool {
        self.contains(Self::TX_PENDING)
    }
}

impl fmt::Display for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED: &[(EventFlags, &str)] = &[
            (EventFlags::TX_PENDING, "TX_PENDING"),
            (EventFlags::REMOVE_EVENT, "REMOVE_EVENT"),
            (EventFlags::SNAPSHOT_BEGIN, "SNAPSHOT_BEGIN"),
            (EventFlags::SNAPSHOT_END, "SNAPSHOT_END"),
            (EventFlags::SNAPSHOT_SNIP, "SNAPSHOT_SNIP"),
            (EventFlags::SNAPSHOT_MODE, "SNAPSHOT_MODE"),
            (EventFlags::REMOVE_SYMBOL, "REMOVE_SYMBOL"),
        ];
        let mut first = true;
        for (flag, name) in NAMED {
            if self.contains(*flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        if first {
            write!(f, "(0x{:02x})", self.bits())
        } else {
            write!(f, " (0x{:02x})", self.bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_names_with_trailing_hex() {
        let flags = EventFlags::SNAPSHOT_BEGIN | EventFlags::TX_PENDING;
        assert_eq!(flags.to_string(), "TX_PENDING|SNAPSHOT_BEGIN (0x05)");
    }

    #[test]
    fn display_empty_mask() {
        assert_eq!(EventFlags::empty().to_string(), "(0x00)");
    }

    #[test]
    fn ends_snapshot_on_end_or_snip() {
        assert!(EventFlags::SNAPSHOT_END.ends_snapshot());
        assert!(EventFlags::SNAPSHOT_SNIP.ends_snapshot());
        assert!(!EventFlags::SNAPSHOT_BEGIN.ends_snapshot());
    }

    #[test]
    fn reserved_bit_5_round_trips() {
        let bits: u8 = 0b0010_0101;
        let flags = EventFlags::from_bits_retain(bits);
        assert_eq!(flags.bits(), bits);
    }
}
