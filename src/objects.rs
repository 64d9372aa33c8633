use crate::error::{Result, TiledError};
use crate::properties::{decode_bool, parse_properties, Properties};
use crate::registry::GidRegistry;
use crate::tree::Element;
use crate::util::Colour;

#[derive(Debug, PartialEq, Clone)]
pub enum ObjectShape {
    Rect,
    Ellipse,
    /// Points are absolute map pixel coordinates.
    Polyline { points: Vec<(f32, f32)> },
    Polygon { points: Vec<(f32, f32)> },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Object {
    pub id: u32,
    /// Compact GID of the tile graphic, 0 for shape objects.
    pub gid: u32,
    pub name: String,
    pub obj_type: String,
    /// Top-left corner, for tile-objects too.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub visible: bool,
    pub shape: ObjectShape,
    pub properties: Properties,
}

impl Object {
    pub(crate) fn from_xml(node: &Element, registry: &mut GidRegistry) -> Result<Object> {
        let ((id, gid, n, t, w, h, v, r), (x, y)) = get_attrs!(
            node.attributes,
            optionals: [
                ("id", id, |v:String| v.parse().ok()),
                ("gid", gid, |v:String| v.parse::<u32>().ok()),
                ("name", name, |v| Some(v)),
                ("type", obj_type, |v| Some(v)),
                ("width", width, |v:String| v.parse().ok()),
                ("height", height, |v:String| v.parse().ok()),
                ("visible", visible, |v: String| decode_bool(&v)),
                ("rotation", rotation, |v:String| v.parse().ok()),
            ],
            required: [
                ("x", x, |v:String| v.parse::<f32>().ok()),
                ("y", y, |v:String| v.parse::<f32>().ok()),
            ],
            TiledError::MalformedAttributes("objects must have an x and a y number".to_string())
        );
        let mut width = w.unwrap_or(0f32);
        let mut height = h.unwrap_or(0f32);

        let gid = match gid {
            Some(raw) if raw != 0 => registry.register_raw(raw),
            _ => 0,
        };

        let mut shape = ObjectShape::Rect;
        if node.child("ellipse").is_some() {
            shape = ObjectShape::Ellipse;
        }
        if let Some(polygon) = node.child("polygon") {
            shape = ObjectShape::Polygon {
                points: Self::parse_points(polygon)?,
            };
        }
        if let Some(polyline) = node.child("polyline") {
            shape = ObjectShape::Polyline {
                points: Self::parse_points(polyline)?,
            };
        }

        // Points arrive relative to the object; the bounding box includes
        // that origin.
        let shape = match shape {
            ObjectShape::Polygon { points } => {
                let (bw, bh, points) = Self::absolute(points, x, y);
                width = bw;
                height = bh;
                ObjectShape::Polygon { points }
            }
            ObjectShape::Polyline { points } => {
                let (bw, bh, points) = Self::absolute(points, x, y);
                width = bw;
                height = bh;
                ObjectShape::Polyline { points }
            }
            other => other,
        };

        Ok(Object {
            id: id.unwrap_or(0),
            gid,
            name: n.unwrap_or_default(),
            obj_type: t.unwrap_or_default(),
            x,
            y,
            width,
            height,
            rotation: r.unwrap_or(0.0),
            visible: v.unwrap_or(true),
            shape,
            properties: parse_properties(node)?,
        })
    }

    fn parse_points(node: &Element) -> Result<Vec<(f32, f32)>> {
        let s = node.attr("points").ok_or_else(|| {
            TiledError::MalformedAttributes(format!("a {} must have points", node.name))
        })?;
        let mut points = Vec::new();
        for pair in s.split_whitespace() {
            let mut coords = pair.split(',').map(|c| c.parse::<f32>().ok());
            match (coords.next(), coords.next(), coords.next()) {
                (Some(Some(x)), Some(Some(y)), None) => points.push((x, y)),
                _ => {
                    return Err(TiledError::MalformedAttributes(format!(
                        "point {:?} is not an x,y pair of numbers",
                        pair
                    )))
                }
            }
        }
        Ok(points)
    }

    fn absolute(points: Vec<(f32, f32)>, x: f32, y: f32) -> (f32, f32, Vec<(f32, f32)>) {
        let (mut x1, mut x2, mut y1, mut y2) = (0f32, 0f32, 0f32, 0f32);
        for &(px, py) in &points {
            x1 = x1.min(px);
            x2 = x2.max(px);
            y1 = y1.min(py);
            y2 = y2.max(py);
        }
        let points = points.into_iter().map(|(px, py)| (px + x, py + y)).collect();
        (x2 - x1, y2 - y1, points)
    }

    /// The polygon or polyline points, if the object has any.
    pub fn points(&self) -> Option<&[(f32, f32)]> {
        match self.shape {
            ObjectShape::Polygon { ref points } | ObjectShape::Polyline { ref points } => {
                Some(points)
            }
            _ => None,
        }
    }

    /// Whether the points form a closed outline (a polygon).
    pub fn closed(&self) -> bool {
        matches!(self.shape, ObjectShape::Polygon { .. })
    }
}

/// An object layer. The objects and the layer's own properties are kept
/// apart.
#[derive(Debug, PartialEq, Clone)]
pub struct ObjectGroup {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub colour: Option<Colour>,
    pub objects: Vec<Object>,
    pub properties: Properties,
    pub layer_index: usize,
}

impl ObjectGroup {
    pub(crate) fn from_xml(
        node: &Element,
        layer_index: usize,
        registry: &mut GidRegistry,
    ) -> Result<ObjectGroup> {
        let ((o, v, c, n), ()) = get_attrs!(
            node.attributes,
            optionals: [
                ("opacity", opacity, |v:String| v.parse().ok()),
                ("visible", visible, |v: String| decode_bool(&v)),
                ("color", colour, |v:String| v.parse().ok()),
                ("name", name, |v| Some(v)),
            ],
            required: [],
            TiledError::MalformedAttributes("object group attributes are malformed".to_string())
        );
        let objects = node
            .children_named("object")
            .map(|o| Object::from_xml(o, registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(ObjectGroup {
            name: n.unwrap_or_default(),
            opacity: o.unwrap_or(1.0),
            visible: v.unwrap_or(true),
            colour: c,
            objects,
            properties: parse_properties(node)?,
            layer_index,
        })
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

impl<'a> IntoIterator for &'a ObjectGroup {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::Flags;

    fn object(xml: &str, registry: &mut GidRegistry) -> Result<Object> {
        Object::from_xml(&Element::parse(xml.as_bytes()).unwrap(), registry)
    }

    #[test]
    fn polygon_points_are_absolute() {
        let mut r = GidRegistry::new();
        let o = object(
            r#"<object id="3" name="zone" x="100" y="50"><polygon points="0,0 10,-5 20,15 -4,8"/></object>"#,
            &mut r,
        )
        .unwrap();
        assert!(o.closed());
        assert_eq!(
            o.points().unwrap(),
            &[(100.0, 50.0), (110.0, 45.0), (120.0, 65.0), (96.0, 58.0)][..]
        );
        assert_eq!((o.width, o.height), (24.0, 20.0));
        assert_eq!(o.gid, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn polyline_is_open() {
        let mut r = GidRegistry::new();
        let o = object(
            r#"<object x="0" y="0"><polyline points="0,0 5,5"/></object>"#,
            &mut r,
        )
        .unwrap();
        assert!(!o.closed());
        assert_eq!(o.points().unwrap().len(), 2);
    }

    #[test]
    fn bad_points() {
        let mut r = GidRegistry::new();
        assert!(object(
            r#"<object x="0" y="0"><polyline points="0,0 5"/></object>"#,
            &mut r
        )
        .is_err());
    }

    #[test]
    fn tile_object_registers_its_gid() {
        let mut r = GidRegistry::new();
        r.register(2, Flags::NONE);
        let o = object(
            r#"<object gid="2147483650" x="8" y="32" width="16" height="16" visible="0"/>"#,
            &mut r,
        )
        .unwrap();
        assert_eq!(o.gid, 2);
        assert_eq!(r.origin(o.gid), Some((2, Flags::FLIP_X)));
        assert_eq!(o.shape, ObjectShape::Rect);
        assert!(!o.visible);
    }

    #[test]
    fn ellipse() {
        let mut r = GidRegistry::new();
        let o = object(
            r#"<object x="1" y="2" width="3" height="4"><ellipse/></object>"#,
            &mut r,
        )
        .unwrap();
        assert_eq!(o.shape, ObjectShape::Ellipse);
        assert_eq!(o.points(), None);
    }

    #[test]
    fn group_views() {
        let mut r = GidRegistry::new();
        let node = Element::parse(
            r##"<objectgroup name="things" color="#00ff00" opacity="0.25">
                <properties><property name="layer" value="spawn"/></properties>
                <object name="a" x="0" y="0"/>
                <object name="b" x="1" y="1"/>
            </objectgroup>"##
                .as_bytes(),
        )
        .unwrap();
        let g = ObjectGroup::from_xml(&node, 4, &mut r).unwrap();
        assert_eq!(g.objects().len(), 2);
        assert_eq!(
            (&g).into_iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert_eq!(g.properties["layer"].as_str(), Some("spawn"));
        assert_eq!(g.colour.map(|c| c.green), Some(0xff));
        assert_eq!(g.opacity, 0.25);
        assert_eq!(g.layer_index, 4);
    }
}
