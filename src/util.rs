use std::str::FromStr;

use crate::error::TiledError;

// Loops through the attributes once and pulls out the ones we ask it to. It
// will check that the required ones are there.
macro_rules! get_attrs {
    ($attrs:expr, optionals: [$(($oName:pat, $oVar:ident, $oMethod:expr)),* $(,)*],
     required: [$(($name:pat, $var:ident, $method:expr)),* $(,)*], $err:expr) => {
        {
            $(let mut $oVar = None;)*
            $(let mut $var = None;)*
            for attr in $attrs.iter() {
                match attr.name.local_name.as_str() {
                    $($oName => $oVar = $oMethod(attr.value.clone()),)*
                    $($name => $var = $method(attr.value.clone()),)*
                    _ => {}
                }
            }
            $(
                let $var = match $var {
                    Some(v) => v,
                    None => return Err($err),
                };
            )*
            (($($oVar),*), ($($var),*))
        }
    }
}

/// A colour as written by Tiled, `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Colour {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Colour {
    /// Packs the colour as `0xAARRGGBB`.
    pub fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.alpha, self.red, self.green, self.blue])
    }
}

impl FromStr for Colour {
    type Err = TiledError;

    fn from_str(s: &str) -> Result<Colour, TiledError> {
        let s = s.trim_start_matches('#');
        let err = || TiledError::MalformedAttributes(format!("invalid colour {:?}", s));
        if !s.is_ascii() {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| err());
        match s.len() {
            6 => Ok(Colour {
                alpha: 0xff,
                red: byte(0)?,
                green: byte(2)?,
                blue: byte(4)?,
            }),
            8 => Ok(Colour {
                alpha: byte(0)?,
                red: byte(2)?,
                green: byte(4)?,
                blue: byte(6)?,
            }),
            _ => Err(err()),
        }
    }
}

/// Kept as metadata only, tiles are always addressed on an orthogonal grid.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Orientation {
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl FromStr for Orientation {
    type Err = TiledError;

    fn from_str(s: &str) -> Result<Orientation, TiledError> {
        match s {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            "staggered" => Ok(Orientation::Staggered),
            "hexagonal" => Ok(Orientation::Hexagonal),
            _ => Err(TiledError::MalformedAttributes(format!(
                "unknown orientation {:?}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_rgb() {
        let c: Colour = "#ff8000".parse().unwrap();
        assert_eq!(
            c,
            Colour {
                alpha: 0xff,
                red: 0xff,
                green: 0x80,
                blue: 0x00
            }
        );
        assert_eq!(c.to_argb(), 0xffff8000);
    }

    #[test]
    fn colour_argb() {
        let c: Colour = "80102030".parse().unwrap();
        assert_eq!(c.alpha, 0x80);
        assert_eq!(c.blue, 0x30);
    }

    #[test]
    fn colour_rejects_garbage() {
        assert!("#12345".parse::<Colour>().is_err());
        assert!("#gg0000".parse::<Colour>().is_err());
    }

    #[test]
    fn orientation() {
        assert_eq!(
            "hexagonal".parse::<Orientation>().unwrap(),
            Orientation::Hexagonal
        );
        assert!("diagonal".parse::<Orientation>().is_err());
    }
}
