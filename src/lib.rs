//! Loads [Tiled](https://www.mapeditor.org/) `.tmx` maps.
//!
//! Tile GIDs in a TMX file are spread over every tileset the map uses and
//! carry flip bits. While loading, each distinct `(tile, flips)` pair a layer
//! or object actually places is given a small, dense *compact GID* instead;
//! layers, objects and the tile property table are all keyed by those.
//!
//! ```no_run
//! let map = tmxmap::parse_file("maps/town.tmx".as_ref()).unwrap();
//! for (x, y, gid) in map.tile_layers().next().unwrap().tiles() {
//!     if let Some(props) = map.tile_properties_by_gid(gid).unwrap() {
//!         println!("{},{}: {:?}", x, y, props);
//!     }
//! }
//! ```

extern crate base64;
extern crate libflate;
#[macro_use]
extern crate log;
extern crate xml;

use std::io::Read;
use std::path::Path;

#[macro_use]
mod util;
mod data;
mod error;
mod gid;
mod layer;
mod loader;
mod map;
mod objects;
mod properties;
mod registry;
mod tileset;
mod tree;

pub use crate::data::{decode_data, Compression, Encoding};
pub use crate::error::{Result, TiledError};
pub use crate::gid::{
    decode_gid, encode_gid, Flags, ALL_FLIP_FLAGS, FLIPPED_DIAGONALLY_FLAG,
    FLIPPED_HORIZONTALLY_FLAG, FLIPPED_VERTICALLY_FLAG,
};
pub use crate::layer::{Cell, ImageLayer, Layer, TileLayer};
pub use crate::loader::{Filesystem, ImageLoader, NoSandboxFilesystem, Rect};
pub use crate::map::Map;
pub use crate::objects::{Object, ObjectGroup, ObjectShape};
pub use crate::properties::{decode_bool, Properties, PropertyValue};
pub use crate::registry::GidRegistry;
pub use crate::tileset::{Image, Tile, Tileset};
pub use crate::tree::Element;
pub use crate::util::{Colour, Orientation};

/// Parse a buffer hopefully containing the contents of a Tiled file, with
/// external tilesets resolved relative to `path` through `fs`.
pub fn parse_with_filesystem<R: Read, F: Filesystem>(
    reader: R,
    path: Option<&Path>,
    fs: &F,
) -> Result<Map> {
    let root = Element::parse(reader)?;
    Map::from_xml(&root, path, fs)
}

/// Parse a buffer hopefully containing the contents of a Tiled file and try to
/// parse it. This augments `parse` with a file location, which is needed when
/// the map refers to external tilesets.
pub fn parse_with_path<R: Read>(reader: R, path: &Path) -> Result<Map> {
    parse_with_filesystem(reader, Some(path), &NoSandboxFilesystem)
}

/// Parse a file hopefully containing a Tiled map and try to parse it.  If the
/// file has an external tileset, the tileset file will be loaded using a path
/// relative to the map file's path.
pub fn parse_file(path: &Path) -> Result<Map> {
    let file = NoSandboxFilesystem
        .open(path)
        .map_err(|source| TiledError::MapUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    parse_with_path(file, path)
}

/// Parse a buffer hopefully containing the contents of a Tiled file and try to
/// parse it. Maps with external tilesets need [`parse_with_path`].
pub fn parse<R: Read>(reader: R) -> Result<Map> {
    parse_with_filesystem(reader, None, &NoSandboxFilesystem)
}

/// Parse a map held in memory.
pub fn parse_str(xml: &str) -> Result<Map> {
    parse(xml.as_bytes())
}

/// Parse a buffer hopefully containing the contents of a Tiled tileset.
///
/// External tilesets do not have a firstgid attribute.  That lives in the
/// map. You must pass in `first_gid`.  If you do not need to use gids for anything,
/// passing in 1 will work fine.
pub fn parse_tileset<R: Read>(reader: R, first_gid: u32) -> Result<Tileset> {
    let root = Element::parse(reader)?;
    if root.name != "tileset" {
        return Err(TiledError::MalformedAttributes(format!(
            "expected a <tileset> document, found <{}>",
            root.name
        )));
    }
    Tileset::new_internal(&root, first_gid)
}
