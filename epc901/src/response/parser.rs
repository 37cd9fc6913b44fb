use core::str::FromStr;

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res},
    multi::many0,
    sequence::{delimited, tuple},
    IResult,
};

use super::FrameMeta;
use crate::error::ProtocolError;

/// Decimal field, optionally padded with spaces
fn decimal<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(delimited(space0, digit1, space0), |digits: &str| {
        digits.parse::<T>()
    })(input)
}

/// Decodes "<frame number>,<timestamp ms>,<exposure us>"
pub(crate) fn metadata_parser(input: &str) -> IResult<&str, FrameMeta> {
    map(
        tuple((
            decimal::<u32>,
            char(','),
            decimal::<u64>,
            char(','),
            decimal::<u32>,
        )),
        |(index, _, timestamp_ms, _, exposure_us)| FrameMeta {
            index,
            timestamp_ms,
            exposure_us,
        },
    )(input)
}

/// Decodes 4 chars formatted as hex into a pixel. For example "0FFF" -> 4095
fn hex_word(input: &str) -> IResult<&str, u16> {
    map_res(
        take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()),
        |hex| u16::from_str_radix(hex, 16),
    )(input)
}

pub(crate) fn pixels_parser(input: &str) -> IResult<&str, Vec<u16>> {
    all_consuming(many0(hex_word))(input)
}

pub fn parse_metadata(line: &str) -> Result<FrameMeta, ProtocolError> {
    all_consuming(metadata_parser)(line)
        .map(|(_, meta)| meta)
        .map_err(|_| ProtocolError::MalformedMetadata(line.to_owned()))
}

/// Splits a data line into pixels. An empty line decodes into an empty frame, it is up to the
/// caller to treat that as end of burst.
pub fn parse_pixel_data(line: &str) -> Result<Vec<u16>, ProtocolError> {
    if line.len() % 4 != 0 {
        return Err(ProtocolError::MalformedPixelData(
            "length is not a multiple of 4",
        ));
    }
    pixels_parser(line)
        .map(|(_, pixels)| pixels)
        .map_err(|_| ProtocolError::MalformedPixelData("contains non-hex characters"))
}
