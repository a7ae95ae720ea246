use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a GPX XML string into GpxData.
///
/// The document must contain a top-level `<gpx>` element; anything outside
/// of it is ignored.
pub fn parse_gpx(xml: &str) -> Result<GpxData> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"gpx" {
                    let data = parse_root(&mut reader)?;
                    tracing::debug!(
                        waypoints = data.waypoints.len(),
                        tracks = data.tracks.len(),
                        "parsed gpx document"
                    );
                    return Ok(data);
                }
                reader.read_to_end(e.name())?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"gpx" => {
                return Ok(GpxData::default());
            }
            Event::Eof => return Err(ParseError::InvalidRoot),
            _ => {}
        }
    }
}

/// Parse the children of `<gpx>`.
fn parse_root<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxData> {
    let mut data = GpxData::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"wpt" => data.waypoints.push(parse_point(&e, reader, "wpt")?),
                b"trk" => data.tracks.push(parse_track(reader)?),
                _ => {
                    // metadata, rte, extensions
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"wpt" => {
                    let (lat, lon) = parse_lat_lon(&e, "wpt")?;
                    data.waypoints.push(GpxPoint::new(lat, lon));
                }
                b"trk" => data.tracks.push(GpxTrack::default()),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"gpx" => break,
            Event::Eof => return Err(unexpected_eof(b"gpx")),
            _ => {}
        }
    }

    Ok(data)
}

/// Parse lat/lon attributes from a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>, element: &'static str) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let val = String::from_utf8_lossy(&attr.value);
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate(&val, element, "lat")?),
            b"lon" => lon = Some(parse_coordinate(&val, element, "lon")?),
            _ => {}
        }
    }

    let lat = lat.ok_or(ParseError::MissingAttribute {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(ParseError::MissingAttribute {
        element,
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

fn parse_coordinate(val: &str, element: &'static str, attribute: &'static str) -> Result<f64> {
    parse_float(val).ok_or_else(|| ParseError::MalformedNumeric {
        element,
        attribute,
        value: val.to_string(),
    })
}

/// Parse a finite float, tolerating surrounding whitespace.
fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn unexpected_eof(open_element: &[u8]) -> ParseError {
    ParseError::UnexpectedEof(String::from_utf8_lossy(open_element).into_owned())
}

/// Parse a `<time>` value. RFC 3339 first, then a zone-less timestamp read as UTC.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Parse a point element (wpt, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    element: &'static str,
) -> Result<GpxPoint> {
    let (lat, lon) = parse_lat_lon(start, element)?;
    let mut point = GpxPoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.ele = parse_float(&text);
                    if point.ele.is_none() && !text.is_empty() {
                        tracing::warn!(element, value = %text, "ignoring unparsable elevation");
                    }
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.time = parse_timestamp(&text);
                    if point.time.is_none() && !text.is_empty() {
                        tracing::warn!(element, value = %text, "ignoring unparsable timestamp");
                    }
                }
                b"name" => point.name = Some(read_text_owned(reader, &e)?),
                b"desc" => point.desc = Some(read_text_owned(reader, &e)?),
                _ => {
                    // Skip unknown/extensions elements
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => return Err(unexpected_eof(&end_name)),
            _ => {}
        }
    }

    Ok(point)
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"trkseg" => {
                track.segments.push(GpxSegment::default());
            }
            Event::End(e) if e.local_name().as_ref() == b"trk" => break,
            Event::Eof => return Err(unexpected_eof(b"trk")),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element. Empty segments are kept so that segment order
/// matches the document.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_point(&e, reader, "trkpt")?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                let (lat, lon) = parse_lat_lon(&e, "trkpt")?;
                segment.points.push(GpxPoint::new(lat, lon));
            }
            Event::End(e) if e.local_name().as_ref() == b"trkseg" => break,
            Event::Eof => return Err(unexpected_eof(b"trkseg")),
            _ => {}
        }
    }

    Ok(segment)
}

/// Read text content of an element as an owned, trimmed String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    match e.as_ref() {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => return Err(unexpected_eof(&end_name)),
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
