use std::collections::HashMap;

use crate::error::{Result, TiledError};
use crate::tree::Element;
use crate::util::Colour;

/// A custom property value, typed by the `type` attribute of its
/// `<property>` element.
#[derive(Debug, PartialEq, Clone)]
pub enum PropertyValue {
    BoolValue(bool),
    FloatValue(f32),
    IntValue(i32),
    /// Packed as `0xAARRGGBB`.
    ColorValue(u32),
    StringValue(String),
}

impl PropertyValue {
    fn new(name: &str, property_type: &str, value: String) -> Result<Self> {
        let decode_error = |value: &str| TiledError::PropertyTypeDecodeError {
            name: name.to_string(),
            property_type: property_type.to_string(),
            value: value.to_string(),
        };

        match property_type {
            "bool" => decode_bool(&value)
                .map(PropertyValue::BoolValue)
                .ok_or_else(|| decode_error(&value)),
            "float" => value
                .trim()
                .parse()
                .map(PropertyValue::FloatValue)
                .map_err(|_| decode_error(&value)),
            "int" => value
                .trim()
                .parse()
                .map(PropertyValue::IntValue)
                .map_err(|_| decode_error(&value)),
            // Tiled writes an empty string for an unset colour.
            "color" if value.is_empty() => Ok(PropertyValue::ColorValue(0)),
            "color" => value
                .parse::<Colour>()
                .map(|c| PropertyValue::ColorValue(c.to_argb()))
                .map_err(|_| decode_error(&value)),
            "string" | "file" => Ok(PropertyValue::StringValue(value)),
            other => {
                debug!(
                    "property {:?} has unhandled type {:?}, keeping it as a string",
                    name, other
                );
                Ok(PropertyValue::StringValue(value))
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropertyValue::BoolValue(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            PropertyValue::IntValue(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match *self {
            PropertyValue::FloatValue(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            PropertyValue::StringValue(ref s) => Some(s),
            _ => None,
        }
    }
}

pub type Properties = HashMap<String, PropertyValue>;

/// Decodes a boolean the way Tiled users write them: integers are true when
/// nonzero, otherwise `true`/`yes`/`false`/`no` in any case.
pub fn decode_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n != 0);
    }
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Collects every `<properties>` block directly under `node`.
pub(crate) fn parse_properties(node: &Element) -> Result<Properties> {
    let mut p = HashMap::new();
    for block in node.children_named("properties") {
        for property in block.children_named("property") {
            let ((property_type, value), name) = get_attrs!(
                property.attributes,
                optionals: [
                    ("type", property_type, |v| Some(v)),
                    ("value", value, |v| Some(v)),
                ],
                required: [
                    ("name", name, |v| Some(v)),
                ],
                TiledError::MalformedAttributes("property must have a name".to_string())
            );
            // Multi-line strings are stored as the element's text.
            let value = value.unwrap_or_else(|| property.text.clone());
            let property_type = property_type.unwrap_or_else(|| "string".to_string());

            let decoded = PropertyValue::new(&name, &property_type, value)?;
            p.insert(name, decoded);
        }
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(xml: &str) -> Result<Properties> {
        parse_properties(&Element::parse(xml.as_bytes()).unwrap())
    }

    #[test]
    fn bool_decoding() {
        assert_eq!(decode_bool("0"), Some(false));
        assert_eq!(decode_bool("12"), Some(true));
        assert_eq!(decode_bool("-1"), Some(true));
        assert_eq!(decode_bool("yes"), Some(true));
        assert_eq!(decode_bool("TRUE"), Some(true));
        assert_eq!(decode_bool("No"), Some(false));
        assert_eq!(decode_bool("maybe"), None);
    }

    #[test]
    fn bool_property_errors_name_the_property() {
        let err = props(
            r#"<tile><properties><property name="solid" type="bool" value="maybe"/></properties></tile>"#,
        )
        .unwrap_err();
        match err {
            TiledError::PropertyTypeDecodeError { name, value, .. } => {
                assert_eq!(name, "solid");
                assert_eq!(value, "maybe");
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn typed_values() {
        let p = props(
            r##"<layer><properties>
                <property name="a" type="bool" value="0"/>
                <property name="b" type="bool" value="yes"/>
                <property name="c" type="int" value="-7"/>
                <property name="d" type="float" value="0.5"/>
                <property name="e" value="plain"/>
                <property name="f" type="color" value="#ff102030"/>
                <property name="g" type="file" value="../a.png"/>
                <property name="h">line one
line two</property>
            </properties></layer>"##,
        )
        .unwrap();
        assert_eq!(p["a"], PropertyValue::BoolValue(false));
        assert_eq!(p["b"], PropertyValue::BoolValue(true));
        assert_eq!(p["c"].as_int(), Some(-7));
        assert_eq!(p["d"].as_float(), Some(0.5));
        assert_eq!(p["e"].as_str(), Some("plain"));
        assert_eq!(p["f"], PropertyValue::ColorValue(0xff102030));
        assert_eq!(p["g"].as_str(), Some("../a.png"));
        assert_eq!(p["h"].as_str(), Some("line one\nline two"));
    }

    #[test]
    fn bad_int_is_a_decode_error() {
        let err = props(
            r#"<map><properties><property name="n" type="int" value="x"/></properties></map>"#,
        )
        .unwrap_err();
        assert!(matches!(err, TiledError::PropertyTypeDecodeError { .. }));
    }

    #[test]
    fn no_block_is_empty() {
        assert!(props("<object/>").unwrap().is_empty());
    }
}
