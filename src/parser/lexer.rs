use nom::{
    character::complete::{alpha1, multispace0},
    combinator::recognize,
    multi::many0,
    branch::alt,
    bytes::complete::tag,
    character::complete::alphanumeric1,
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it tolerates surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a floating point literal (e.g. 54, 0.8, -1e3)
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// Parse an identifier: letters followed by letters, digits or underscores
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_"))))))(input)
}
