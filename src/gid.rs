//! Raw tile GIDs carry their flip and rotation state in the three high bits.

use std::fmt;
use std::ops::BitOr;

pub const FLIPPED_HORIZONTALLY_FLAG: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY_FLAG: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY_FLAG: u32 = 0x2000_0000;
pub const ALL_FLIP_FLAGS: u32 =
    FLIPPED_HORIZONTALLY_FLAG | FLIPPED_VERTICALLY_FLAG | FLIPPED_DIAGONALLY_FLAG;

/// The transformations applied to a placed tile.
#[derive(Default, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const FLIP_X: Flags = Flags(1);
    pub const FLIP_Y: Flags = Flags(2);
    pub const ROTATED: Flags = Flags(4);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `None` if `bits` has anything outside the three known flags.
    pub fn from_bits(bits: u8) -> Option<Flags> {
        if bits & !0b111 == 0 {
            Some(Flags(bits))
        } else {
            None
        }
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn flip_x(self) -> bool {
        self.contains(Flags::FLIP_X)
    }

    pub fn flip_y(self) -> bool {
        self.contains(Flags::FLIP_Y)
    }

    pub fn rotated(self) -> bool {
        self.contains(Flags::ROTATED)
    }
}

impl BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut set = f.debug_set();
        if self.flip_x() {
            set.entry(&"FLIP_X");
        }
        if self.flip_y() {
            set.entry(&"FLIP_Y");
        }
        if self.rotated() {
            set.entry(&"ROTATED");
        }
        set.finish()
    }
}

/// Splits a raw GID into its base GID and flags.
pub fn decode_gid(raw_gid: u32) -> (u32, Flags) {
    let mut flags = Flags::NONE;
    if raw_gid & FLIPPED_HORIZONTALLY_FLAG != 0 {
        flags = flags | Flags::FLIP_X;
    }
    if raw_gid & FLIPPED_VERTICALLY_FLAG != 0 {
        flags = flags | Flags::FLIP_Y;
    }
    if raw_gid & FLIPPED_DIAGONALLY_FLAG != 0 {
        flags = flags | Flags::ROTATED;
    }
    (raw_gid & !ALL_FLIP_FLAGS, flags)
}

/// Inverse of [`decode_gid`]. Bits of `base_gid` overlapping the flag bits
/// are dropped.
pub fn encode_gid(base_gid: u32, flags: Flags) -> u32 {
    let mut raw = base_gid & !ALL_FLIP_FLAGS;
    if flags.flip_x() {
        raw |= FLIPPED_HORIZONTALLY_FLAG;
    }
    if flags.flip_y() {
        raw |= FLIPPED_VERTICALLY_FLAG;
    }
    if flags.rotated() {
        raw |= FLIPPED_DIAGONALLY_FLAG;
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn zero_is_empty() {
        assert_eq!(decode_gid(0), (0, Flags::NONE));
    }

    #[test]
    fn flipped_x() {
        assert_eq!(decode_gid(0x8000_0007), (7, Flags::FLIP_X));
    }

    #[test]
    fn all_flags() {
        let (base, flags) = decode_gid(0xe000_0001);
        assert_eq!(base, 1);
        assert!(flags.flip_x() && flags.flip_y() && flags.rotated());
        assert_eq!(flags.bits(), 7);
    }

    #[test]
    fn from_bits_rejects_unknown() {
        assert_eq!(Flags::from_bits(3), Some(Flags::FLIP_X | Flags::FLIP_Y));
        assert_eq!(Flags::from_bits(8), None);
    }

    #[test]
    fn debug_lists_flags() {
        assert_eq!(
            format!("{:?}", Flags::FLIP_Y | Flags::ROTATED),
            r#"{"FLIP_Y", "ROTATED"}"#
        );
    }

    quickcheck! {
        fn roundtrip(raw: u32) -> bool {
            let (base, flags) = decode_gid(raw);
            encode_gid(base, flags) == raw
        }

        fn base_has_no_flag_bits(raw: u32) -> bool {
            decode_gid(raw).0 & ALL_FLIP_FLAGS == 0
        }
    }
}
