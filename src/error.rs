use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TiledError>;

/// Errors which occured when loading or querying a map.
#[derive(Debug, Error)]
pub enum TiledError {
    /// A attribute was missing, had the wrong type or wasn't formated
    /// correctly.
    #[error("{0}")]
    MalformedAttributes(String),
    #[error("coordinates ({x}, {y}) on layer {layer} are out of range")]
    MalformedCoordinates { x: i32, y: i32, layer: i32 },
    #[error("layer {0} is not a tile layer")]
    NotATileLayer(usize),
    #[error("no layer named {0:?}")]
    UnknownLayer(String),
    #[error("no object named {0:?}")]
    UnknownObject(String),
    #[error("gid {0} has not been allocated")]
    InvalidGid(u32),
    #[error("layer data encoding {0:?} is not supported")]
    UnsupportedEncoding(String),
    #[error("layer data compression {0:?} is not supported")]
    UnsupportedCompression(String),
    #[error("layer {layer:?} holds {found} tiles, expected {expected}")]
    TruncatedLayerData {
        layer: String,
        expected: usize,
        found: usize,
    },
    #[error("layer data is malformed: {0}")]
    MalformedLayerData(String),
    /// Tile layers store cells as `u16`.
    #[error("gid {0} does not fit in a tile layer cell")]
    GidOverflow(u32),
    #[error("cannot load external tileset {path:?}: {reason}")]
    ExternalTilesetUnreachable { path: PathBuf, reason: String },
    #[error("property {name:?} of type {property_type} cannot hold {value:?}")]
    PropertyTypeDecodeError {
        name: String,
        property_type: String,
        value: String,
    },
    #[error("failed to decode base64 layer data: {0}")]
    Base64DecodingError(#[from] base64::DecodeError),
    /// An error occured when decompressing using the
    /// [libflate](https://github.com/sile/libflate) crate.
    #[error("failed to decompress layer data: {0}")]
    DecompressingError(#[source] io::Error),
    #[error(transparent)]
    XmlDecodingError(#[from] xml::reader::Error),
    #[error("{0}")]
    PrematureEnd(String),
    #[error("cannot read map file {path:?}")]
    MapUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
