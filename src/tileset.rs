use std::collections::HashMap;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use crate::error::{Result, TiledError};
use crate::loader::{Filesystem, Rect};
use crate::properties::{parse_properties, Properties, PropertyValue};
use crate::registry::GidRegistry;
use crate::tree::Element;
use crate::util::Colour;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Image {
    /// The filepath of the image, as written in the file.
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub transparent_colour: Option<Colour>,
}

impl Image {
    pub(crate) fn from_xml(node: &Element) -> Result<Image> {
        let ((c, w, h), s) = get_attrs!(
            node.attributes,
            optionals: [
                ("trans", trans, |v:String| v.parse().ok()),
                ("width", width, |v:String| v.parse().ok()),
                ("height", height, |v:String| v.parse().ok()),
            ],
            required: [
                ("source", source, |v| Some(v)),
            ],
            TiledError::MalformedAttributes("image must have a source".to_string())
        );
        Ok(Image {
            source: s,
            width: w.unwrap_or(0),
            height: h.unwrap_or(0),
            transparent_colour: c,
        })
    }
}

/// Per-tile metadata declared inside a tileset.
#[derive(Debug, PartialEq, Clone)]
pub struct Tile {
    /// Local id within the tileset.
    pub id: u32,
    pub tile_type: Option<String>,
    /// Only set for tilesets built from a collection of images.
    pub image: Option<Image>,
    /// `None` when the tile has no `<properties>` block.
    pub properties: Option<Properties>,
}

impl Tile {
    fn from_xml(node: &Element) -> Result<Tile> {
        let (tile_type, id) = get_attrs!(
            node.attributes,
            optionals: [
                ("type", tile_type, |v| Some(v)),
            ],
            required: [
                ("id", id, |v:String| v.parse::<u32>().ok()),
            ],
            TiledError::MalformedAttributes("tile must have an id with the correct type".to_string())
        );
        let image = match node.child("image") {
            Some(image) => Some(Image::from_xml(image)?),
            None => None,
        };
        let properties = match node.child("properties") {
            Some(_) => Some(parse_properties(node)?),
            None => None,
        };
        Ok(Tile {
            id,
            tile_type,
            image,
            properties,
        })
    }
}

/// A tileset, usually the tilesheet image.
#[derive(Debug, PartialEq, Clone)]
pub struct Tileset {
    /// The GID of the first tile stored
    pub first_gid: u32,
    /// Path of the external `.tsx` file, as written in the map.
    pub source: Option<String>,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub image: Option<Image>,
    pub tiles: Vec<Tile>,
    pub properties: Properties,
    tile_count: Option<u32>,
    columns: Option<u32>,
}

impl Tileset {
    /// Parses a map's `<tileset>` element, following external references,
    /// and records the properties of every used tile in `tile_properties`.
    pub(crate) fn from_xml<F: Filesystem>(
        node: &Element,
        map_dir: Option<&Path>,
        fs: &F,
        registry: &GidRegistry,
        tile_properties: &mut HashMap<u32, Properties>,
    ) -> Result<Tileset> {
        let first_gid = node
            .attr("firstgid")
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| {
                TiledError::MalformedAttributes("tileset must have a firstgid".to_string())
            })?;
        let tileset = match node.attr("source") {
            Some(source) => Self::new_reference(source, first_gid, map_dir, fs)?,
            None => Self::new_internal(node, first_gid)?,
        };
        tileset.register_tile_properties(registry, tile_properties)?;
        Ok(tileset)
    }

    /// Parses a tileset definition. External files never carry a firstgid,
    /// so it is always passed in.
    pub(crate) fn new_internal(node: &Element, first_gid: u32) -> Result<Tileset> {
        let ((name, spacing, margin, tile_count, columns), (tile_width, tile_height)) = get_attrs!(
            node.attributes,
            optionals: [
                ("name", name, |v| Some(v)),
                ("spacing", spacing, |v:String| v.parse().ok()),
                ("margin", margin, |v:String| v.parse().ok()),
                ("tilecount", tile_count, |v:String| v.parse().ok()),
                ("columns", columns, |v:String| v.parse().ok()),
            ],
            required: [
                ("tilewidth", tile_width, |v:String| v.parse().ok()),
                ("tileheight", tile_height, |v:String| v.parse().ok()),
            ],
            TiledError::MalformedAttributes("tileset must have a tile width and height with correct types".to_string())
        );
        let image = match node.child("image") {
            Some(image) => Some(Image::from_xml(image)?),
            None => None,
        };
        let tiles = node
            .children_named("tile")
            .map(Tile::from_xml)
            .collect::<Result<Vec<_>>>()?;

        Ok(Tileset {
            first_gid,
            source: None,
            name: name.unwrap_or_default(),
            tile_width,
            tile_height,
            spacing: spacing.unwrap_or(0),
            margin: margin.unwrap_or(0),
            image,
            tiles,
            properties: parse_properties(node)?,
            tile_count,
            columns,
        })
    }

    fn new_reference<F: Filesystem>(
        source: &str,
        first_gid: u32,
        map_dir: Option<&Path>,
        fs: &F,
    ) -> Result<Tileset> {
        let unreachable = |path: PathBuf, reason: String| TiledError::ExternalTilesetUnreachable { path, reason };

        let is_tsx = Path::new(source)
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("tsx"));
        if !is_tsx {
            return Err(unreachable(
                PathBuf::from(source),
                "only .tsx tileset references are supported".to_string(),
            ));
        }
        let path = match map_dir {
            Some(dir) => dir.join(source),
            None => {
                return Err(unreachable(
                    PathBuf::from(source),
                    "maps with external tilesets must know their file location".to_string(),
                ))
            }
        };

        debug!("loading external tileset {:?}", path);
        let file = fs
            .open(&path)
            .map_err(|e| unreachable(path.clone(), e.to_string()))?;
        let root = Element::parse(file).map_err(|e| unreachable(path.clone(), e.to_string()))?;
        if root.name != "tileset" {
            return Err(unreachable(
                path,
                format!("root element is <{}>, not <tileset>", root.name),
            ));
        }

        let mut tileset = Self::new_internal(&root, first_gid)?;
        tileset.source = Some(source.to_string());
        Ok(tileset)
    }

    /// Stores each declared tile's properties under every compact GID
    /// allocated for it. Tiles no layer or object uses get no entry.
    fn register_tile_properties(
        &self,
        registry: &GidRegistry,
        tile_properties: &mut HashMap<u32, Properties>,
    ) -> Result<()> {
        for tile in &self.tiles {
            let declared = match tile.properties {
                Some(ref p) => p,
                None => continue,
            };
            let base_gid = self.first_gid.checked_add(tile.id).ok_or_else(|| {
                TiledError::MalformedAttributes(format!(
                    "tile {} of tileset {:?} is past the last gid",
                    tile.id, self.name
                ))
            })?;
            let origins = registry.lookup_origins(base_gid);
            if origins.is_empty() {
                continue;
            }

            let mut p = declared.clone();
            for &(key, value) in &[("width", self.tile_width), ("height", self.tile_height)] {
                if p.contains_key(key) {
                    debug!(
                        "tile {} of tileset {:?} defines its own {:?} property",
                        tile.id, self.name, key
                    );
                    continue;
                }
                let value = i32::try_from(value).map_err(|_| {
                    TiledError::MalformedAttributes(format!(
                        "tile {} of tileset {:?} is too large",
                        key, self.name
                    ))
                })?;
                p.insert(key.to_string(), PropertyValue::IntValue(value));
            }
            for &(gid, _) in origins {
                tile_properties.insert(gid, p.clone());
            }
        }
        Ok(())
    }

    /// Number of tiles in the tileset.
    pub fn tile_count(&self) -> u32 {
        if let Some(count) = self.tile_count {
            return count;
        }
        match (self.columns(), self.rows()) {
            (Some(c), Some(r)) => c.saturating_mul(r),
            _ => self
                .tiles
                .iter()
                .map(|t| t.id.saturating_add(1))
                .max()
                .unwrap_or(0),
        }
    }

    /// Tiles per row of the sheet image.
    pub fn columns(&self) -> Option<u32> {
        self.columns
            .or_else(|| self.image.as_ref().map(|i| fit(i.width, self.tile_width, self.margin, self.spacing)))
    }

    fn rows(&self) -> Option<u32> {
        self.image
            .as_ref()
            .map(|i| fit(i.height, self.tile_height, self.margin, self.spacing))
    }

    /// Whether `base_gid` falls in this tileset's range.
    pub fn contains(&self, base_gid: u32) -> bool {
        base_gid >= self.first_gid && base_gid - self.first_gid < self.tile_count()
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// The image and pixel region holding the graphic for `base_gid`.
    /// `None` when the region lies beyond what a `u32` can address.
    pub fn tile_region(&self, base_gid: u32) -> Option<(&str, Rect)> {
        if !self.contains(base_gid) {
            return None;
        }
        let id = base_gid - self.first_gid;
        if let Some(image) = self.tile(id).and_then(|t| t.image.as_ref()) {
            return Some((
                &image.source,
                Rect {
                    x: 0,
                    y: 0,
                    width: image.width,
                    height: image.height,
                },
            ));
        }

        let image = self.image.as_ref()?;
        let columns = self.columns().filter(|&c| c > 0)?;
        let offset = |n: u32, tile: u32| {
            n.checked_mul(tile)?
                .checked_add(n.checked_mul(self.spacing)?)?
                .checked_add(self.margin)
        };
        Some((
            &image.source,
            Rect {
                x: offset(id % columns, self.tile_width)?,
                y: offset(id / columns, self.tile_height)?,
                width: self.tile_width,
                height: self.tile_height,
            },
        ))
    }
}

// How many tiles of `tile` pixels fit in `total` pixels.
fn fit(total: u32, tile: u32, margin: u32, spacing: u32) -> u32 {
    if tile == 0 {
        return 0;
    }
    let usable = total
        .saturating_sub(margin.saturating_mul(2))
        .saturating_add(spacing);
    usable / tile.saturating_add(spacing)
}
