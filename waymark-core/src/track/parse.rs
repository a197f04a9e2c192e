//! Streaming GPX reader.
//!
//! Only `<trk>` content is extracted: every `<trkseg>` becomes a segment and
//! every `<trkpt>` inside it a point. Everything else is skipped, but the
//! whole document must still be well-formed.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Track, TrackParseError, TrackPoint};

type Result<T> = std::result::Result<T, TrackParseError>;

/// Accumulates segments while walking the document.
#[derive(Debug, Default)]
struct TrackBuilder {
    name: Option<String>,
    segments: Vec<Vec<TrackPoint>>,
    missing_elevations: usize,
}

impl TrackBuilder {
    fn offer_name(&mut self, name: String) {
        if self.name.is_none() && !name.is_empty() {
            self.name = Some(name);
        }
    }

    fn finish(self) -> Result<Track> {
        Track::from_segments(self.name, self.segments, self.missing_elevations)
    }
}

/// Parse GPX text into a [`Track`].
///
/// # Errors
///
/// - [`TrackParseError::Malformed`] when the text is not well-formed XML or
///   has no root element.
/// - [`TrackParseError::NoTrackSegments`] when no `<trkseg>` holds a point.
/// - [`TrackParseError::MissingAttribute`] / [`TrackParseError::InvalidAttribute`]
///   when a `<trkpt>` has a missing or unusable `lat`/`lon`.
///
/// # Examples
///
/// ```
/// use waymark_core::parse_track;
///
/// let track = parse_track(r#"<gpx><trk><name>Ridge</name><trkseg>
///     <trkpt lat="46.5" lon="7.9"/>
/// </trkseg></trk></gpx>"#)?;
/// assert_eq!(track.name(), Some("Ridge"));
/// assert!(track.elevation_missing());
/// # Ok::<(), waymark_core::TrackParseError>(())
/// ```
pub fn parse_track(raw: &str) -> Result<Track> {
    let mut reader = Reader::from_str(raw);
    let mut builder = TrackBuilder::default();
    let mut saw_root = false;
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                if e.local_name().as_ref() == b"trk" {
                    parse_trk(&mut reader, &mut builder)?;
                } else {
                    depth += 1;
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Eof) => break,
            Err(err) => return Err(TrackParseError::malformed(&err)),
            _ => {}
        }
    }

    if !saw_root {
        return Err(TrackParseError::Malformed {
            message: "document has no root element".to_owned(),
        });
    }
    if depth != 0 {
        return Err(TrackParseError::unexpected_eof("document"));
    }
    builder.finish()
}

fn parse_trk(reader: &mut Reader<&[u8]>, builder: &mut TrackBuilder) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    let name = read_text(reader, &e)?;
                    builder.offer_name(name);
                }
                b"trkseg" => {
                    let segment = parse_segment(reader, &mut builder.missing_elevations)?;
                    builder.segments.push(segment);
                }
                _ => skip(reader, &e)?,
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => return Ok(()),
            Ok(Event::Eof) => return Err(TrackParseError::unexpected_eof("trk")),
            Err(err) => return Err(TrackParseError::malformed(&err)),
            _ => {}
        }
    }
}

fn parse_segment(
    reader: &mut Reader<&[u8]>,
    missing_elevations: &mut usize,
) -> Result<Vec<TrackPoint>> {
    let mut points = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (point, has_elevation) = parse_point(reader, &e)?;
                    if !has_elevation {
                        *missing_elevations += 1;
                    }
                    points.push(point);
                } else {
                    skip(reader, &e)?;
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (latitude, longitude) = parse_lat_lon(&e)?;
                    *missing_elevations += 1;
                    points.push(TrackPoint::new(latitude, longitude, 0.0));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => return Ok(points),
            Ok(Event::Eof) => return Err(TrackParseError::unexpected_eof("trkseg")),
            Err(err) => return Err(TrackParseError::malformed(&err)),
            _ => {}
        }
    }
}

/// Parse a `<trkpt>` body. Returns the point and whether `<ele>` was usable.
fn parse_point(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<(TrackPoint, bool)> {
    let (latitude, longitude) = parse_lat_lon(start)?;
    let mut elevation: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"ele" {
                    let text = read_text(reader, &e)?;
                    elevation = text.parse::<f64>().ok().filter(|value| value.is_finite());
                } else {
                    skip(reader, &e)?;
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkpt" => break,
            Ok(Event::Eof) => return Err(TrackParseError::unexpected_eof("trkpt")),
            Err(err) => return Err(TrackParseError::malformed(&err)),
            _ => {}
        }
    }

    let point = TrackPoint::new(latitude, longitude, elevation.unwrap_or(0.0));
    Ok((point, elevation.is_some()))
}

fn parse_lat_lon(start: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|err| TrackParseError::malformed(&err))?;
        match attr.key.local_name().as_ref() {
            b"lat" => latitude = Some(parse_coordinate("lat", &attr.value, 90.0)?),
            b"lon" => longitude = Some(parse_coordinate("lon", &attr.value, 180.0)?),
            _ => {}
        }
    }

    let latitude = latitude.ok_or(TrackParseError::MissingAttribute { attribute: "lat" })?;
    let longitude = longitude.ok_or(TrackParseError::MissingAttribute { attribute: "lon" })?;
    Ok((latitude, longitude))
}

fn parse_coordinate(attribute: &'static str, raw: &[u8], limit: f64) -> Result<f64> {
    let invalid = || TrackParseError::InvalidAttribute {
        attribute,
        value: String::from_utf8_lossy(raw).into_owned(),
    };
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    let value = text.trim().parse::<f64>().map_err(|_| invalid())?;
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(invalid())
    }
}

fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let text = reader
        .read_text(start.name())
        .map_err(|err| TrackParseError::malformed(&err))?;
    Ok(text.trim().to_owned())
}

fn skip(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    reader
        .read_to_end(start.name())
        .map_err(|err| TrackParseError::malformed(&err))?;
    Ok(())
}
