use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::TiledError;
use crate::gid::Flags;

/// A pixel rectangle inside an image.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Opens the files a map refers to: external `.tsx` tilesets, and the map
/// itself when loaded by path.
pub trait Filesystem {
    type Reader: Read;
    fn open(&self, path: &Path) -> io::Result<Self::Reader>;
}

/// Turns a tile's image region into whatever the application renders with.
///
/// `flags` are the flip/rotation of the placed tile; applying them is up to
/// the loader.
pub trait ImageLoader {
    type Handle;
    fn load_tile(&self, source: &str, region: Rect, flags: Flags) -> Result<Self::Handle, TiledError>;
}

/// Loads files directly from the filesystem with no sandboxing, nor other restrictions.  This is not particularly safe!
/// If you load User Generated Content or other naughty content, you're at least vulnerable to DoS attacks in the form
/// of intentionally loading more files than you have RAM for, or leaking personal data by loading files the game has no
/// business accessing.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoSandboxFilesystem;

impl Filesystem for NoSandboxFilesystem {
    type Reader = BufReader<File>;

    fn open(&self, path: &Path) -> io::Result<BufReader<File>> {
        File::open(path).map(BufReader::new)
    }
}
