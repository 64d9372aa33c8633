use std::convert::TryFrom;

use crate::error::{Result, TiledError};
use crate::objects::ObjectGroup;
use crate::properties::{decode_bool, parse_properties, Properties};
use crate::registry::GidRegistry;
use crate::tileset::Image;
use crate::tree::Element;

/// Storage type of a tile layer cell.
pub type Cell = u16;

/// A grid of compact GIDs.
#[derive(Debug, PartialEq, Clone)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub opacity: f32,
    pub visible: bool,
    pub offset_x: f32,
    pub offset_y: f32,
    pub properties: Properties,
    /// Position among the map's layers in draw order.
    pub layer_index: usize,
    /// `tiles[y][x]`, 0 is an empty cell.
    tiles: Vec<Vec<Cell>>,
}

impl TileLayer {
    /// Folds raw GIDs into a `height` x `width` grid, row by row,
    /// registering each one.
    pub fn from_raw_gids<I>(
        name: String,
        width: u32,
        height: u32,
        raw_gids: I,
        registry: &mut GidRegistry,
    ) -> Result<TileLayer>
    where
        I: IntoIterator<Item = u32>,
    {
        let expected = width as usize * height as usize;
        let mut raw_gids = raw_gids.into_iter();
        let mut tiles = Vec::with_capacity(height as usize);
        let mut found = 0;
        for _ in 0..height {
            let mut row = Vec::with_capacity(width as usize);
            for _ in 0..width {
                let raw = raw_gids.next().ok_or_else(|| TiledError::TruncatedLayerData {
                    layer: name.clone(),
                    expected,
                    found,
                })?;
                let gid = registry.register_raw(raw);
                row.push(Cell::try_from(gid).map_err(|_| TiledError::GidOverflow(gid))?);
                found += 1;
            }
            tiles.push(row);
        }
        let excess = raw_gids.count();
        if excess > 0 {
            warn!("layer {:?} has {} tiles past its end", name, excess);
        }

        Ok(TileLayer {
            name,
            width,
            height,
            opacity: 1.0,
            visible: true,
            offset_x: 0.0,
            offset_y: 0.0,
            properties: Properties::new(),
            layer_index: 0,
            tiles,
        })
    }

    pub(crate) fn from_xml(
        node: &Element,
        layer_index: usize,
        map_width: u32,
        map_height: u32,
        registry: &mut GidRegistry,
    ) -> Result<TileLayer> {
        let ((n, w, h, o, v, ox, oy), ()) = get_attrs!(
            node.attributes,
            optionals: [
                ("name", name, |v| Some(v)),
                ("width", width, |v:String| v.parse().ok()),
                ("height", height, |v:String| v.parse().ok()),
                ("opacity", opacity, |v:String| v.parse().ok()),
                ("visible", visible, |v: String| decode_bool(&v)),
                ("offsetx", offset_x, |v:String| v.parse().ok()),
                ("offsety", offset_y, |v:String| v.parse().ok()),
            ],
            required: [],
            TiledError::MalformedAttributes("layer attributes are malformed".to_string())
        );
        let name = n.unwrap_or_default();
        let raw_gids = match node.child("data") {
            Some(data) => crate::data::decode_data(data)?,
            None => Vec::new(),
        };

        let mut layer = TileLayer::from_raw_gids(
            name,
            w.unwrap_or(map_width),
            h.unwrap_or(map_height),
            raw_gids,
            registry,
        )?;
        layer.opacity = o.unwrap_or(1.0);
        layer.visible = v.unwrap_or(true);
        layer.offset_x = ox.unwrap_or(0.0);
        layer.offset_y = oy.unwrap_or(0.0);
        layer.properties = parse_properties(node)?;
        layer.layer_index = layer_index;
        Ok(layer)
    }

    /// The compact GID at `(x, y)`.
    pub fn tile_at(&self, x: i32, y: i32) -> Result<u32> {
        let cell = usize::try_from(y)
            .ok()
            .and_then(|y| self.tiles.get(y))
            .and_then(|row| usize::try_from(x).ok().and_then(|x| row.get(x)));
        match cell {
            Some(&gid) => Ok(u32::from(gid)),
            None => Err(TiledError::MalformedCoordinates {
                x,
                y,
                layer: self.layer_index as i32,
            }),
        }
    }

    /// All cells as `(x, y, gid)`, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &gid)| (x as u32, y as u32, u32::from(gid)))
        })
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.tiles
    }
}

/// A layer consisting of a single image.
#[derive(Debug, PartialEq, Clone)]
pub struct ImageLayer {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub offset_x: f32,
    pub offset_y: f32,
    pub image: Option<Image>,
    pub properties: Properties,
    pub layer_index: usize,
}

impl ImageLayer {
    pub(crate) fn from_xml(node: &Element, layer_index: usize) -> Result<ImageLayer> {
        let ((n, o, v, ox, oy), ()) = get_attrs!(
            node.attributes,
            optionals: [
                ("name", name, |v| Some(v)),
                ("opacity", opacity, |v:String| v.parse().ok()),
                ("visible", visible, |v: String| decode_bool(&v)),
                ("offsetx", offset_x, |v:String| v.parse().ok()),
                ("offsety", offset_y, |v:String| v.parse().ok()),
            ],
            required: [],
            TiledError::MalformedAttributes("image layer attributes are malformed".to_string())
        );
        let image = match node.child("image") {
            Some(image) => Some(Image::from_xml(image)?),
            None => None,
        };
        Ok(ImageLayer {
            name: n.unwrap_or_default(),
            opacity: o.unwrap_or(1.0),
            visible: v.unwrap_or(true),
            offset_x: ox.unwrap_or(0.0),
            offset_y: oy.unwrap_or(0.0),
            image,
            properties: parse_properties(node)?,
            layer_index,
        })
    }
}

/// Any of the three layer kinds, as stored in the map's draw order.
#[derive(Debug, PartialEq, Clone)]
pub enum Layer {
    Tiles(TileLayer),
    Image(ImageLayer),
    Objects(ObjectGroup),
}

impl Layer {
    pub fn name(&self) -> &str {
        match *self {
            Layer::Tiles(ref l) => &l.name,
            Layer::Image(ref l) => &l.name,
            Layer::Objects(ref g) => &g.name,
        }
    }

    pub fn visible(&self) -> bool {
        match *self {
            Layer::Tiles(ref l) => l.visible,
            Layer::Image(ref l) => l.visible,
            Layer::Objects(ref g) => g.visible,
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            Layer::Tiles(ref l) => l.layer_index,
            Layer::Image(ref l) => l.layer_index,
            Layer::Objects(ref g) => g.layer_index,
        }
    }

    pub fn properties(&self) -> &Properties {
        match *self {
            Layer::Tiles(ref l) => &l.properties,
            Layer::Image(ref l) => &l.properties,
            Layer::Objects(ref g) => &g.properties,
        }
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match *self {
            Layer::Tiles(ref l) => Some(l),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&ObjectGroup> {
        match *self {
            Layer::Objects(ref g) => Some(g),
            _ => None,
        }
    }
}
