//! Decoding of a tile layer's `<data>` block into raw GIDs.

use std::io::{BufReader, Read};
use std::str::FromStr;

use crate::error::{Result, TiledError};
use crate::tree::Element;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Encoding {
    /// One `<tile gid="..."/>` element per cell.
    Xml,
    Csv,
    Base64,
}

impl FromStr for Encoding {
    type Err = TiledError;

    fn from_str(s: &str) -> Result<Encoding> {
        match s {
            "" => Ok(Encoding::Xml),
            "csv" => Ok(Encoding::Csv),
            "base64" => Ok(Encoding::Base64),
            e => Err(TiledError::UnsupportedEncoding(e.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Compression {
    None,
    Zlib,
    Gzip,
}

impl FromStr for Compression {
    type Err = TiledError;

    fn from_str(s: &str) -> Result<Compression> {
        match s {
            "" => Ok(Compression::None),
            "zlib" => Ok(Compression::Zlib),
            "gzip" => Ok(Compression::Gzip),
            c => Err(TiledError::UnsupportedCompression(c.to_string())),
        }
    }
}

/// Decodes a `<data>` element into raw GIDs in document order.
pub fn decode_data(data: &Element) -> Result<Vec<u32>> {
    let encoding: Encoding = data.attr("encoding").unwrap_or("").parse()?;
    let compression: Compression = data.attr("compression").unwrap_or("").parse()?;

    match (encoding, compression) {
        (Encoding::Xml, Compression::None) => decode_tiles(data),
        (Encoding::Csv, Compression::None) => decode_csv(&data.text),
        (Encoding::Base64, c) => decode_base64(&data.text, c),
        (_, _) => Err(TiledError::UnsupportedCompression(format!(
            "{} with {:?} encoding",
            data.attr("compression").unwrap_or(""),
            encoding
        ))),
    }
}

fn decode_tiles(data: &Element) -> Result<Vec<u32>> {
    data.children_named("tile")
        .map(|tile| match tile.attr("gid") {
            Some(gid) => gid.trim().parse().map_err(|_| {
                TiledError::MalformedLayerData(format!("tile gid {:?} is not a number", gid))
            }),
            None => Ok(0),
        })
        .collect()
}

pub fn decode_csv(text: &str) -> Result<Vec<u32>> {
    let joined: String = text.lines().map(str::trim).collect();
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    joined
        .split(',')
        .map(str::trim)
        .map(|v| {
            v.parse().map_err(|_| {
                TiledError::MalformedLayerData(format!("csv entry {:?} is not a gid", v))
            })
        })
        .collect()
}

pub fn decode_base64(text: &str, compression: Compression) -> Result<Vec<u32>> {
    // Tiled wraps long base64 runs across lines.
    let packed: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = base64::decode(&packed)?;
    let bytes = match compression {
        Compression::None => bytes,
        Compression::Zlib => decode_zlib(bytes)?,
        Compression::Gzip => decode_gzip(bytes)?,
    };
    Ok(convert_to_u32(&bytes))
}

fn decode_zlib(data: Vec<u8>) -> Result<Vec<u8>> {
    use libflate::zlib::Decoder;
    let mut zd = Decoder::new(BufReader::new(&data[..])).map_err(TiledError::DecompressingError)?;
    let mut data = Vec::new();
    zd.read_to_end(&mut data)
        .map_err(TiledError::DecompressingError)?;
    Ok(data)
}

fn decode_gzip(data: Vec<u8>) -> Result<Vec<u8>> {
    use libflate::gzip::Decoder;
    let mut zd = Decoder::new(BufReader::new(&data[..])).map_err(TiledError::DecompressingError)?;
    let mut data = Vec::new();
    zd.read_to_end(&mut data)
        .map_err(TiledError::DecompressingError)?;
    Ok(data)
}

// Little-endian words; a trailing partial word is dropped.
fn convert_to_u32(all: &[u8]) -> Vec<u32> {
    all.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
