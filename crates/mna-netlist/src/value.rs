use nom::{
    IResult, Parser,
    bytes::complete::{is_not, take_while1},
    combinator::map_res,
};

use crate::prelude::*;

/// Parses a numeric value with an optional metric suffix (case-insensitive):
/// `F` femto, `P` pico, `N` nano, `U` micro, `M` milli, `K` kilo, `MEG`
/// mega, `G` giga, `T` tera. A bare number is parsed as-is, including
/// scientific notation.
pub fn parse_value(s: &str) -> Result<f64> {
    let upper = s.to_uppercase();

    let (mantissa, multiplier) = if upper.ends_with("MEG") {
        (&upper[..upper.len() - 3], 1e6)
    } else if let Some(suffix) = upper.chars().last() {
        match suffix {
            'F' => (&upper[..upper.len() - 1], 1e-15),
            'P' => (&upper[..upper.len() - 1], 1e-12),
            'N' => (&upper[..upper.len() - 1], 1e-9),
            'U' => (&upper[..upper.len() - 1], 1e-6),
            'M' => (&upper[..upper.len() - 1], 1e-3),
            'K' => (&upper[..upper.len() - 1], 1e3),
            'G' => (&upper[..upper.len() - 1], 1e9),
            'T' => (&upper[..upper.len() - 1], 1e12),
            _ => (upper.as_str(), 1.0),
        }
    } else {
        (upper.as_str(), 1.0)
    };

    let base: f64 = mantissa
        .parse()
        .map_err(|_| Error::InvalidFloatValue(s.to_string()))?;
    Ok(base * multiplier)
}

pub fn alphanumeric_or_underscore1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// A nom parser for a bare value token (any run of non-separator
/// characters), parsed with [`parse_value`].
pub fn value_parser(input: &str) -> IResult<&str, f64> {
    map_res(is_not(",:"), parse_value).parse(input)
}
