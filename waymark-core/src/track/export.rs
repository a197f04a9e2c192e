//! GPX serialisation for tracks and planned routes.

use geo::{Coord, LineString};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{GpxWriteError, Track};

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const GPX_CREATOR: &str = "waymark";

/// One exported point: position plus optional elevation.
type ExportPoint = (Coord<f64>, Option<f64>);

/// Serialise a parsed track back into a GPX 1.1 document.
///
/// Each segment becomes its own `<trkseg>`; elevations are always written.
///
/// # Errors
///
/// Returns [`GpxWriteError::Xml`] if the XML writer fails.
pub fn track_to_gpx(track: &Track) -> Result<String, GpxWriteError> {
    let segments: Vec<Vec<ExportPoint>> = track
        .segments()
        .iter()
        .map(|segment| {
            segment
                .points()
                .iter()
                .map(|point| (point.coord(), Some(point.elevation)))
                .collect()
        })
        .collect();
    write_document(track.name(), &segments)
}

/// Serialise a `[lon, lat]` line, e.g. a planned route, as a one-segment GPX
/// track without elevations.
///
/// # Errors
///
/// Returns [`GpxWriteError::EmptyGeometry`] for an empty line and
/// [`GpxWriteError::Xml`] if the XML writer fails.
///
/// # Examples
///
/// ```
/// use geo::LineString;
/// use waymark_core::{line_to_gpx, parse_track};
///
/// let line: LineString<f64> = vec![(7.0, 46.0), (7.1, 46.1)].into();
/// let gpx = line_to_gpx("Planned", &line)?;
/// let track = parse_track(&gpx)?;
/// assert_eq!(track.point_count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn line_to_gpx(name: &str, line: &LineString<f64>) -> Result<String, GpxWriteError> {
    if line.0.is_empty() {
        return Err(GpxWriteError::EmptyGeometry);
    }
    let segment: Vec<ExportPoint> = line.coords().map(|coord| (*coord, None)).collect();
    write_document(Some(name), &[segment])
}

fn write_document(name: Option<&str>, segments: &[Vec<ExportPoint>]) -> Result<String, GpxWriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", GPX_CREATOR));
    root.push_attribute(("xmlns", GPX_NAMESPACE));
    emit(&mut writer, Event::Start(root))?;
    emit(&mut writer, Event::Start(BytesStart::new("trk")))?;
    if let Some(name) = name {
        write_text_element(&mut writer, "name", name)?;
    }

    for segment in segments {
        emit(&mut writer, Event::Start(BytesStart::new("trkseg")))?;
        for (coord, elevation) in segment {
            write_point(&mut writer, *coord, *elevation)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("trkseg")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("trk")))?;
    emit(&mut writer, Event::End(BytesEnd::new("gpx")))?;

    String::from_utf8(writer.into_inner()).map_err(|err| GpxWriteError::Xml {
        message: err.to_string(),
    })
}

fn write_point(
    writer: &mut Writer<Vec<u8>>,
    coord: Coord<f64>,
    elevation: Option<f64>,
) -> Result<(), GpxWriteError> {
    let lat = coord.y.to_string();
    let lon = coord.x.to_string();
    let mut start = BytesStart::new("trkpt");
    start.push_attribute(("lat", lat.as_str()));
    start.push_attribute(("lon", lon.as_str()));

    match elevation {
        Some(ele) => {
            emit(writer, Event::Start(start))?;
            write_text_element(writer, "ele", &ele.to_string())?;
            emit(writer, Event::End(BytesEnd::new("trkpt")))
        }
        None => emit(writer, Event::Empty(start)),
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), GpxWriteError> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), GpxWriteError> {
    writer.write_event(event).map_err(|err| GpxWriteError::Xml {
        message: err.to_string(),
    })
}
