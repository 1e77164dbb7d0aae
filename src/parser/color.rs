// CSS color parser: #rgb, #rrggbb, #rrggbbaa, rgb(), rgba(), named colors

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::char,
    combinator::{all_consuming, map_opt, opt},
    sequence::preceded,
    IResult,
};

use super::lexer::{identifier, number_literal, ws};

/// An 8-bit RGB color with a 0..=1 alpha channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Rgba {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Format as `rgba(r, g, b, a)`
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Parse a color string. Returns `None` for anything unrecognised.
pub fn parse_color(input: &str) -> Option<Rgba> {
    all_consuming(ws(alt((hex_color, rgb_function, named_color))))(input)
        .ok()
        .map(|(_, c)| c)
}

/// Same hue as `color` with the given alpha, in `rgba()` form
pub fn translucent(color: &str, alpha: f64) -> Option<String> {
    parse_color(color).map(|c| c.with_alpha(alpha).to_css())
}

fn hex_color(input: &str) -> IResult<&str, Rgba> {
    map_opt(
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())),
        decode_hex,
    )(input)
}

fn decode_hex(hex: &str) -> Option<Rgba> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Some(Rgba::opaque(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => {
            let a = channel(&hex[6..8])? as f64 / 255.0;
            Some(Rgba::opaque(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?).with_alpha(a))
        }
        _ => None,
    }
}

/// Parse rgb(54, 96, 146) or rgba(54, 96, 146, 0.8)
fn rgb_function(input: &str) -> IResult<&str, Rgba> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, r) = ws(channel)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, g) = ws(channel)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, b) = ws(channel)(input)?;
    let (input, a) = opt(preceded(char(','), ws(number_literal)))(input)?;
    let (input, _) = char(')')(input)?;

    Ok((input, Rgba::opaque(r, g, b).with_alpha(a.unwrap_or(1.0))))
}

fn channel(input: &str) -> IResult<&str, u8> {
    map_opt(number_literal, |v| {
        if (0.0..=255.0).contains(&v) {
            Some(v.round() as u8)
        } else {
            None
        }
    })(input)
}

fn named_color(input: &str) -> IResult<&str, Rgba> {
    map_opt(identifier, lookup_named)(input)
}

fn lookup_named(name: &str) -> Option<Rgba> {
    let c = match name.to_lowercase().as_str() {
        "transparent" => return Some(Rgba::opaque(0, 0, 0).with_alpha(0.0)),
        "white" => Rgba::opaque(255, 255, 255),
        "black" => Rgba::opaque(0, 0, 0),
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "yellow" => Rgba::opaque(255, 255, 0),
        "cyan" => Rgba::opaque(0, 255, 255),
        "magenta" => Rgba::opaque(255, 0, 255),
        "orange" => Rgba::opaque(255, 165, 0),
        "purple" => Rgba::opaque(128, 0, 128),
        "pink" => Rgba::opaque(255, 192, 203),
        "brown" => Rgba::opaque(139, 69, 19),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "darkgray" | "darkgrey" => Rgba::opaque(64, 64, 64),
        "lightgray" | "lightgrey" => Rgba::opaque(192, 192, 192),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(parse_color("#365F92"), Some(Rgba::opaque(0x36, 0x5f, 0x92)));
        assert_eq!(parse_color("#fff"), Some(Rgba::opaque(255, 255, 255)));
        assert_eq!(parse_color("#00000080").map(|c| (c.a * 100.0).round()), Some(50.0));
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse_color("rgb(54, 96, 146)"), Some(Rgba::opaque(54, 96, 146)));
        let c = parse_color(" rgba(54,96,146,0.8) ").unwrap();
        assert_eq!((c.r, c.g, c.b), (54, 96, 146));
        assert_eq!(c.a, 0.8);
        assert_eq!(parse_color("rgba(300, 0, 0, 1)"), None);
        assert_eq!(parse_color("rgba(1, 2, 3, 1) trailing"), None);
    }

    #[test]
    fn test_named() {
        assert_eq!(parse_color("Orange"), Some(Rgba::opaque(255, 165, 0)));
        assert_eq!(parse_color("transparent").map(|c| c.a), Some(0.0));
        assert_eq!(parse_color("notacolor"), None);
    }

    #[test]
    fn test_translucent() {
        assert_eq!(
            translucent("rgba(54, 96, 146, 1)", 0.2).as_deref(),
            Some("rgba(54, 96, 146, 0.2)")
        );
        assert_eq!(translucent("#ff0000", 0.2).as_deref(), Some("rgba(255, 0, 0, 0.2)"));
        assert_eq!(translucent("???", 0.2), None);
    }
}
