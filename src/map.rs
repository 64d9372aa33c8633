use std::collections::HashMap;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use crate::error::{Result, TiledError};
use crate::layer::{ImageLayer, Layer, TileLayer};
use crate::loader::{Filesystem, ImageLoader};
use crate::objects::{Object, ObjectGroup};
use crate::properties::{parse_properties, Properties, PropertyValue};
use crate::registry::GidRegistry;
use crate::tileset::Tileset;
use crate::tree::Element;
use crate::util::{Colour, Orientation};

/// Tiled `.tmx` files will be parsed into this.  Holds all the layers and tilesets.
#[derive(Debug, PartialEq, Clone)]
pub struct Map {
    pub version: String,
    pub orientation: Orientation,
    /// Size in tiles.
    pub width: u32,
    pub height: u32,
    /// Size of a grid cell in pixels.
    pub tile_width: u32,
    pub tile_height: u32,
    pub background_colour: Option<Colour>,
    pub properties: Properties,
    pub tilesets: Vec<Tileset>,
    /// Where the map was loaded from, if it came from a file.
    pub path: Option<PathBuf>,
    layers: Vec<Layer>,
    registry: GidRegistry,
    tile_properties: HashMap<u32, Properties>,
}

impl Map {
    pub(crate) fn from_xml<F: Filesystem>(
        root: &Element,
        map_path: Option<&Path>,
        fs: &F,
    ) -> Result<Map> {
        if root.name != "map" {
            return Err(TiledError::MalformedAttributes(format!(
                "expected a <map> document, found <{}>",
                root.name
            )));
        }
        let ((version, background_colour), (orientation, width, height, tile_width, tile_height)) = get_attrs!(
            root.attributes,
            optionals: [
                ("version", version, |v| Some(v)),
                ("backgroundcolor", colour, |v:String| v.parse().ok()),
            ],
            required: [
                ("orientation", orientation, |v:String| v.parse().ok()),
                ("width", width, |v:String| v.parse().ok()),
                ("height", height, |v:String| v.parse().ok()),
                ("tilewidth", tile_width, |v:String| v.parse().ok()),
                ("tileheight", tile_height, |v:String| v.parse().ok()),
            ],
            TiledError::MalformedAttributes("map must have an orientation, width, height, tile width and tile height with correct types".to_string())
        );

        // Layer indices follow document order, whatever kind the layer is.
        let layer_nodes: Vec<(usize, &Element)> = root
            .children
            .iter()
            .filter(|c| matches!(c.name.as_str(), "layer" | "imagelayer" | "objectgroup"))
            .enumerate()
            .collect();
        let of_kind = |kind: &'static str| {
            layer_nodes
                .iter()
                .filter(move |(_, node)| node.name == kind)
                .map(|&(i, node)| (i, node))
        };

        // Tilesets back-fill tile properties from the GIDs the layers and
        // objects registered, so they have to come after them.
        let mut registry = GidRegistry::new();
        let mut layers = Vec::with_capacity(layer_nodes.len());
        for (i, node) in of_kind("layer") {
            layers.push(Layer::Tiles(TileLayer::from_xml(
                node,
                i,
                width,
                height,
                &mut registry,
            )?));
        }
        for (i, node) in of_kind("imagelayer") {
            layers.push(Layer::Image(ImageLayer::from_xml(node, i)?));
        }
        for (i, node) in of_kind("objectgroup") {
            layers.push(Layer::Objects(ObjectGroup::from_xml(
                node,
                i,
                &mut registry,
            )?));
        }

        let map_dir = map_path.and_then(Path::parent);
        let mut tile_properties = HashMap::new();
        let tilesets = root
            .children_named("tileset")
            .map(|node| Tileset::from_xml(node, map_dir, fs, &registry, &mut tile_properties))
            .collect::<Result<Vec<_>>>()?;

        layers.sort_by_key(Layer::index);

        let mut map = Map {
            version: version.unwrap_or_else(|| "1.0".to_string()),
            orientation,
            width,
            height,
            tile_width,
            tile_height,
            background_colour,
            properties: parse_properties(root)?,
            tilesets,
            path: map_path.map(Path::to_path_buf),
            layers,
            registry,
            tile_properties,
        };
        map.finish_tile_objects();

        debug!(
            "loaded {}x{} map with {} layers, {} tilesets and {} distinct tiles",
            map.width,
            map.height,
            map.layers.len(),
            map.tilesets.len(),
            map.registry.len()
        );
        Ok(map)
    }

    // Tiled anchors tile-objects at their bottom-left corner; every other
    // object is anchored top-left. Also merges in the tile's properties,
    // which only exist once the tilesets are parsed; they replace the
    // object's own values on a clash.
    fn finish_tile_objects(&mut self) {
        let Map {
            ref mut layers,
            ref registry,
            ref tile_properties,
            ref tilesets,
            tile_height,
            ..
        } = *self;
        let groups = layers.iter_mut().filter_map(|l| match *l {
            Layer::Objects(ref mut g) => Some(g),
            _ => None,
        });
        for group in groups {
            for object in group.objects.iter_mut().filter(|o| o.gid != 0) {
                let height = registry
                    .origin(object.gid)
                    .and_then(|(base, _)| tileset_for(tilesets, base))
                    .map_or(tile_height, |ts| ts.tile_height);
                object.y -= height as f32;

                if let Some(p) = tile_properties.get(&object.gid) {
                    object
                        .properties
                        .extend(p.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
    }

    /// Layers in draw order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible())
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(Layer::as_tiles)
    }

    pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroup> {
        self.layers.iter().filter_map(Layer::as_objects)
    }

    /// Every object of every object group.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.object_groups().flat_map(|g| g.objects.iter())
    }

    /// Names are case-sensitive; the first match in draw order wins.
    pub fn layer_by_name(&self, name: &str) -> Result<&Layer> {
        self.layers
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| TiledError::UnknownLayer(name.to_string()))
    }

    pub fn object_by_name(&self, name: &str) -> Result<&Object> {
        self.objects()
            .find(|o| o.name == name)
            .ok_or_else(|| TiledError::UnknownObject(name.to_string()))
    }

    /// Layers that define any of `names` as a property.
    pub fn layers_with_property<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a Layer> {
        self.layers
            .iter()
            .filter(move |l| names.iter().any(|n| l.properties().contains_key(*n)))
    }

    /// Layers whose property `name` equals `value`. A layer without the
    /// property inherits the map's.
    pub fn layers_matching<'a>(
        &'a self,
        name: &'a str,
        value: &'a PropertyValue,
    ) -> impl Iterator<Item = &'a Layer> {
        self.layers.iter().filter(move |l| {
            l.properties()
                .get(name)
                .or_else(|| self.properties.get(name))
                == Some(value)
        })
    }

    pub fn registry(&self) -> &GidRegistry {
        &self.registry
    }

    /// This function will return the correct Tileset given a base GID.
    pub fn tileset_by_gid(&self, base_gid: u32) -> Option<&Tileset> {
        tileset_for(&self.tilesets, base_gid)
    }

    fn tile_layer(&self, x: i32, y: i32, layer: i32) -> Result<&TileLayer> {
        let index = usize::try_from(layer)
            .map_err(|_| TiledError::MalformedCoordinates { x, y, layer })?;
        match self.layers.get(index) {
            Some(Layer::Tiles(l)) => Ok(l),
            Some(_) => Err(TiledError::NotATileLayer(index)),
            None => Err(TiledError::MalformedCoordinates { x, y, layer }),
        }
    }

    /// The compact GID at a position of the `layer`th layer in draw order.
    pub fn tile_gid_at(&self, x: i32, y: i32, layer: i32) -> Result<u32> {
        self.tile_layer(x, y, layer)?.tile_at(x, y)
    }

    /// Properties of the tile at a position, `None` for empty cells and
    /// tiles without properties.
    pub fn tile_properties_at(&self, x: i32, y: i32, layer: i32) -> Result<Option<&Properties>> {
        let gid = self.tile_gid_at(x, y, layer)?;
        self.tile_properties_by_gid(gid)
    }

    /// `Ok(None)` for the empty tile and for tiles without properties.
    pub fn tile_properties_by_gid(&self, gid: u32) -> Result<Option<&Properties>> {
        if gid > self.registry.max_gid() {
            return Err(TiledError::InvalidGid(gid));
        }
        Ok(self.tile_properties.get(&gid))
    }

    /// Replaces the properties of an allocated compact GID.
    pub fn set_tile_properties(&mut self, gid: u32, properties: Properties) -> Result<()> {
        if gid == 0 || gid > self.registry.max_gid() {
            return Err(TiledError::InvalidGid(gid));
        }
        self.tile_properties.insert(gid, properties);
        Ok(())
    }

    /// Loads the graphic of the tile at a position. Empty cells give `None`.
    pub fn tile_image_at<L: ImageLoader>(
        &self,
        x: i32,
        y: i32,
        layer: i32,
        loader: &L,
    ) -> Result<Option<L::Handle>> {
        let gid = self.tile_gid_at(x, y, layer)?;
        self.tile_image_by_gid(gid, loader)
    }

    /// Loads the graphic of a compact GID, flipped and rotated as it was
    /// placed. `None` for the empty tile and for tiles no tileset covers.
    pub fn tile_image_by_gid<L: ImageLoader>(&self, gid: u32, loader: &L) -> Result<Option<L::Handle>> {
        if gid == 0 {
            return Ok(None);
        }
        let (base, flags) = self.registry.origin(gid).ok_or(TiledError::InvalidGid(gid))?;
        let region = self
            .tileset_by_gid(base)
            .and_then(|ts| ts.tile_region(base));
        match region {
            Some((source, rect)) => loader.load_tile(source, rect, flags).map(Some),
            None => {
                warn!("gid {} (tile {}) is not covered by any tileset", gid, base);
                Ok(None)
            }
        }
    }
}

// The tileset with the highest firstgid not above `base_gid`.
fn tileset_for(tilesets: &[Tileset], base_gid: u32) -> Option<&Tileset> {
    tilesets
        .iter()
        .filter(|ts| ts.first_gid <= base_gid)
        .max_by_key(|ts| ts.first_gid)
}
