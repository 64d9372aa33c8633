//! Allocation of compact GIDs.
//!
//! Only the tiles a map actually places get an id, so the ids stay dense and
//! start at 1 no matter how many tilesets the map pulls in. Every distinct
//! `(base_gid, flags)` pair gets its own id, which lets a renderer keep one
//! pre-transformed image per id.

use std::collections::HashMap;

use crate::gid::{decode_gid, Flags};

#[derive(Debug, PartialEq, Clone, Default)]
pub struct GidRegistry {
    forward: HashMap<(u32, Flags), u32>,
    reverse: HashMap<u32, Vec<(u32, Flags)>>,
    // origins[compact - 1]
    origins: Vec<(u32, Flags)>,
}

impl GidRegistry {
    pub fn new() -> GidRegistry {
        GidRegistry::default()
    }

    /// Returns the compact GID for `(base_gid, flags)`, allocating one on
    /// first sight. Base GID 0 is the empty tile and always maps to 0.
    pub fn register(&mut self, base_gid: u32, flags: Flags) -> u32 {
        if base_gid == 0 {
            return 0;
        }
        if let Some(&gid) = self.forward.get(&(base_gid, flags)) {
            return gid;
        }
        self.origins.push((base_gid, flags));
        let gid = self.origins.len() as u32;
        self.forward.insert((base_gid, flags), gid);
        self.reverse
            .entry(base_gid)
            .or_insert_with(Vec::new)
            .push((gid, flags));
        gid
    }

    /// Decodes a raw GID read from a file and registers it.
    pub fn register_raw(&mut self, raw_gid: u32) -> u32 {
        let (base_gid, flags) = decode_gid(raw_gid);
        self.register(base_gid, flags)
    }

    /// Every compact GID allocated for `base_gid`, in allocation order.
    pub fn lookup_origins(&self, base_gid: u32) -> &[(u32, Flags)] {
        self.reverse.get(&base_gid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The `(base_gid, flags)` pair a compact GID was allocated for.
    pub fn origin(&self, gid: u32) -> Option<(u32, Flags)> {
        if gid == 0 {
            return None;
        }
        self.origins.get(gid as usize - 1).copied()
    }

    /// Number of allocated compact GIDs.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// The highest allocated compact GID, 0 when nothing is allocated.
    pub fn max_gid(&self) -> u32 {
        self.origins.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use std::collections::HashSet;

    #[test]
    fn zero_never_allocates() {
        let mut r = GidRegistry::new();
        assert_eq!(r.register(0, Flags::NONE), 0);
        assert_eq!(r.register(0, Flags::FLIP_X | Flags::ROTATED), 0);
        assert!(r.is_empty());
        assert!(r.lookup_origins(0).is_empty());
    }

    #[test]
    fn allocates_from_one_in_order() {
        let mut r = GidRegistry::new();
        assert_eq!(r.register(40, Flags::NONE), 1);
        assert_eq!(r.register(3, Flags::NONE), 2);
        assert_eq!(r.register(40, Flags::NONE), 1);
        assert_eq!(r.register(40, Flags::FLIP_Y), 3);
        assert_eq!(r.max_gid(), 3);
        assert_eq!(
            r.lookup_origins(40),
            &[(1, Flags::NONE), (3, Flags::FLIP_Y)][..]
        );
        assert_eq!(r.origin(3), Some((40, Flags::FLIP_Y)));
        assert_eq!(r.origin(0), None);
        assert_eq!(r.origin(4), None);
    }

    #[test]
    fn flipped_raw_gid_gets_its_own_id() {
        let mut r = GidRegistry::new();
        let flipped = r.register_raw(0x8000_0007);
        let plain = r.register(7, Flags::NONE);
        assert_ne!(flipped, plain);
        assert_eq!(r.origin(flipped), Some((7, Flags::FLIP_X)));
    }

    #[test]
    fn unknown_base_has_no_origins() {
        let r = GidRegistry::new();
        assert!(r.lookup_origins(12).is_empty());
    }

    quickcheck! {
        fn dedup(pairs: Vec<(u16, u8)>) -> bool {
            let mut r = GidRegistry::new();
            let pairs: Vec<(u32, Flags)> = pairs
                .into_iter()
                .map(|(g, f)| (u32::from(g), Flags::from_bits(f & 7).unwrap()))
                .collect();
            let first: Vec<u32> = pairs.iter().map(|&(g, f)| r.register(g, f)).collect();
            let again: Vec<u32> = pairs.iter().map(|&(g, f)| r.register(g, f)).collect();
            let distinct: HashSet<_> = pairs.iter().filter(|p| p.0 != 0).collect();
            first == again && r.len() == distinct.len()
        }
    }
}
