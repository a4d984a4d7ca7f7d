//! Typed attribute parsing shared by the component schemas.
//!
//! Attribute values arrive as strings from the document or from attribute
//! updates. Each component turns them into typed config fields through the
//! helpers here, which apply the same rules as the declarative schema: numbers
//! are clamped to their bounds, enums must name a known variant and vectors
//! must carry every component.

use glam::{Vec2, Vec3, Vec4};
use log::warn;
use thiserror::Error;

/// Errors raised while converting attribute strings into typed values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown attribute `{attribute}` for component `{component}`")]
    UnknownAttribute { component: String, attribute: String },
    #[error("`{attribute}` expects a number, got `{value}`")]
    InvalidNumber { attribute: String, value: String },
    #[error("`{attribute}` expects {expected} components, got `{value}`")]
    InvalidVector {
        attribute: String,
        expected: usize,
        value: String,
    },
    #[error("`{attribute}` expects true or false, got `{value}`")]
    InvalidBoolean { attribute: String, value: String },
    #[error("`{attribute}` is not a recognised color: `{value}`")]
    InvalidColor { attribute: String, value: String },
    #[error("`{attribute}` must be one of {allowed:?}, got `{value}`")]
    UnknownVariant {
        attribute: String,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("malformed property list entry `{entry}`")]
    MalformedProperty { entry: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

pub fn parse_float(attribute: &str, value: &str) -> SchemaResult<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| SchemaError::InvalidNumber {
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

/// Parses a float and clamps it into `[min, max]`.
pub fn parse_bounded_float(
    attribute: &str,
    value: &str,
    min: Option<f32>,
    max: Option<f32>,
) -> SchemaResult<f32> {
    let parsed = parse_float(attribute, value)?;
    let clamped = clamp(parsed, min, max);
    if clamped != parsed {
        warn!("`{attribute}` value {parsed} is out of bounds, using {clamped}");
    }
    Ok(clamped)
}

fn clamp(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let value = min.map_or(value, |min| value.max(min));
    max.map_or(value, |max| value.min(max))
}

fn parse_components<const N: usize>(attribute: &str, value: &str) -> SchemaResult<[f32; N]> {
    let invalid = || SchemaError::InvalidVector {
        attribute: attribute.to_string(),
        expected: N,
        value: value.to_string(),
    };
    let mut components = [0.0; N];
    let mut parts = value.split_whitespace();
    for slot in components.iter_mut() {
        *slot = parts
            .next()
            .and_then(|part| part.parse::<f32>().ok())
            .filter(|number| number.is_finite())
            .ok_or_else(invalid)?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(components)
}

pub fn parse_vec2(attribute: &str, value: &str) -> SchemaResult<Vec2> {
    parse_components::<2>(attribute, value).map(Vec2::from_array)
}

pub fn parse_vec3(attribute: &str, value: &str) -> SchemaResult<Vec3> {
    parse_components::<3>(attribute, value).map(Vec3::from_array)
}

pub fn parse_vec4(attribute: &str, value: &str) -> SchemaResult<Vec4> {
    parse_components::<4>(attribute, value).map(Vec4::from_array)
}

pub fn parse_bool(attribute: &str, value: &str) -> SchemaResult<bool> {
    match value.trim() {
        "true" | "" => Ok(true),
        "false" => Ok(false),
        other => Err(SchemaError::InvalidBoolean {
            attribute: attribute.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a CSS color keyword into
/// linear 0..1 components.
pub fn parse_color(attribute: &str, value: &str) -> SchemaResult<Vec3> {
    let trimmed = value.trim();
    let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(body) = trimmed
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        parse_rgb_function(body)
    } else {
        named_color(&trimmed.to_ascii_lowercase())
    };
    parsed.ok_or_else(|| SchemaError::InvalidColor {
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

fn parse_hex(hex: &str) -> Option<Vec3> {
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let mut chars = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            (chars.next()??, chars.next()??, chars.next()??)
        }
        6 => (
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        ),
        _ => return None,
    };
    Some(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
}

fn parse_rgb_function(body: &str) -> Option<Vec3> {
    let channels: Vec<f32> = body
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<_>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Vec3::new(*r, *g, *b).clamp(Vec3::ZERO, Vec3::splat(255.0)) / 255.0),
        _ => None,
    }
}

/// CSS color keywords, sorted by name.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("aliceblue", "f0f8ff"),
    ("antiquewhite", "faebd7"),
    ("aqua", "00ffff"),
    ("aquamarine", "7fffd4"),
    ("azure", "f0ffff"),
    ("beige", "f5f5dc"),
    ("bisque", "ffe4c4"),
    ("black", "000000"),
    ("blanchedalmond", "ffebcd"),
    ("blue", "0000ff"),
    ("blueviolet", "8a2be2"),
    ("brown", "a52a2a"),
    ("burlywood", "deb887"),
    ("cadetblue", "5f9ea0"),
    ("chartreuse", "7fff00"),
    ("chocolate", "d2691e"),
    ("coral", "ff7f50"),
    ("cornflowerblue", "6495ed"),
    ("cornsilk", "fff8dc"),
    ("crimson", "dc143c"),
    ("cyan", "00ffff"),
    ("darkblue", "00008b"),
    ("darkcyan", "008b8b"),
    ("darkgoldenrod", "b8860b"),
    ("darkgray", "a9a9a9"),
    ("darkgreen", "006400"),
    ("darkgrey", "a9a9a9"),
    ("darkkhaki", "bdb76b"),
    ("darkmagenta", "8b008b"),
    ("darkolivegreen", "556b2f"),
    ("darkorange", "ff8c00"),
    ("darkorchid", "9932cc"),
    ("darkred", "8b0000"),
    ("darksalmon", "e9967a"),
    ("darkseagreen", "8fbc8f"),
    ("darkslateblue", "483d8b"),
    ("darkslategray", "2f4f4f"),
    ("darkslategrey", "2f4f4f"),
    ("darkturquoise", "00ced1"),
    ("darkviolet", "9400d3"),
    ("deeppink", "ff1493"),
    ("deepskyblue", "00bfff"),
    ("dimgray", "696969"),
    ("dimgrey", "696969"),
    ("dodgerblue", "1e90ff"),
    ("firebrick", "b22222"),
    ("floralwhite", "fffaf0"),
    ("forestgreen", "228b22"),
    ("fuchsia", "ff00ff"),
    ("gainsboro", "dcdcdc"),
    ("ghostwhite", "f8f8ff"),
    ("gold", "ffd700"),
    ("goldenrod", "daa520"),
    ("gray", "808080"),
    ("green", "008000"),
    ("greenyellow", "adff2f"),
    ("grey", "808080"),
    ("honeydew", "f0fff0"),
    ("hotpink", "ff69b4"),
    ("indianred", "cd5c5c"),
    ("indigo", "4b0082"),
    ("ivory", "fffff0"),
    ("khaki", "f0e68c"),
    ("lavender", "e6e6fa"),
    ("lavenderblush", "fff0f5"),
    ("lawngreen", "7cfc00"),
    ("lemonchiffon", "fffacd"),
    ("lightblue", "add8e6"),
    ("lightcoral", "f08080"),
    ("lightcyan", "e0ffff"),
    ("lightgoldenrodyellow", "fafad2"),
    ("lightgray", "d3d3d3"),
    ("lightgreen", "90ee90"),
    ("lightgrey", "d3d3d3"),
    ("lightpink", "ffb6c1"),
    ("lightsalmon", "ffa07a"),
    ("lightseagreen", "20b2aa"),
    ("lightskyblue", "87cefa"),
    ("lightslategray", "778899"),
    ("lightslategrey", "778899"),
    ("lightsteelblue", "b0c4de"),
    ("lightyellow", "ffffe0"),
    ("lime", "00ff00"),
    ("limegreen", "32cd32"),
    ("linen", "faf0e6"),
    ("magenta", "ff00ff"),
    ("maroon", "800000"),
    ("mediumaquamarine", "66cdaa"),
    ("mediumblue", "0000cd"),
    ("mediumorchid", "ba55d3"),
    ("mediumpurple", "9370db"),
    ("mediumseagreen", "3cb371"),
    ("mediumslateblue", "7b68ee"),
    ("mediumspringgreen", "00fa9a"),
    ("mediumturquoise", "48d1cc"),
    ("mediumvioletred", "c71585"),
    ("midnightblue", "191970"),
    ("mintcream", "f5fffa"),
    ("mistyrose", "ffe4e1"),
    ("moccasin", "ffe4b5"),
    ("navajowhite", "ffdead"),
    ("navy", "000080"),
    ("oldlace", "fdf5e6"),
    ("olive", "808000"),
    ("olivedrab", "6b8e23"),
    ("orange", "ffa500"),
    ("orangered", "ff4500"),
    ("orchid", "da70d6"),
    ("palegoldenrod", "eee8aa"),
    ("palegreen", "98fb98"),
    ("paleturquoise", "afeeee"),
    ("palevioletred", "db7093"),
    ("papayawhip", "ffefd5"),
    ("peachpuff", "ffdab9"),
    ("peru", "cd853f"),
    ("pink", "ffc0cb"),
    ("plum", "dda0dd"),
    ("powderblue", "b0e0e6"),
    ("purple", "800080"),
    ("rebeccapurple", "663399"),
    ("red", "ff0000"),
    ("rosybrown", "bc8f8f"),
    ("royalblue", "4169e1"),
    ("saddlebrown", "8b4513"),
    ("salmon", "fa8072"),
    ("sandybrown", "f4a460"),
    ("seagreen", "2e8b57"),
    ("seashell", "fff5ee"),
    ("sienna", "a0522d"),
    ("silver", "c0c0c0"),
    ("skyblue", "87ceeb"),
    ("slateblue", "6a5acd"),
    ("slategray", "708090"),
    ("slategrey", "708090"),
    ("snow", "fffafa"),
    ("springgreen", "00ff7f"),
    ("steelblue", "4682b4"),
    ("tan", "d2b48c"),
    ("teal", "008080"),
    ("thistle", "d8bfd8"),
    ("tomato", "ff6347"),
    ("turquoise", "40e0d0"),
    ("violet", "ee82ee"),
    ("wheat", "f5deb3"),
    ("white", "ffffff"),
    ("whitesmoke", "f5f5f5"),
    ("yellow", "ffff00"),
    ("yellowgreen", "9acd32"),
];

fn named_color(name: &str) -> Option<Vec3> {
    let index = NAMED_COLORS
        .binary_search_by_key(&name, |&(keyword, _)| keyword)
        .ok()?;
    parse_hex(NAMED_COLORS[index].1)
}

/// Splits an inline `name: value; name: value` property list.
pub fn parse_property_list(value: &str) -> SchemaResult<Vec<(String, String)>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| SchemaError::MalformedProperty {
                    entry: entry.to_string(),
                })?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
