//! Track storage and tolerant GPX parsing
//!
//! This module provides the `Track` struct holding an ordered sequence of
//! [`GeoPoint`]s in file order. Parsing is streaming and forgiving: individual
//! track points with unusable coordinates are skipped, and points whose time
//! cannot be parsed are kept without time information. Only an unreadable or
//! non-XML file, or one without a single usable point, fails as a whole.

use crate::{DataError, GeoPoint, Result, utils};
use geo::{Coord, Rect};
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use time::OffsetDateTime;

/// Local name of a track point element
const TRKPT: &[u8] = b"trkpt";
/// Local name of the time element nested in a track point
const TIME: &[u8] = b"time";

/// An ordered sequence of recorded positions
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Track {
    points: Vec<GeoPoint>,
}

/// State of the first `<time>` child of the track point being read
#[derive(Debug)]
enum TimeChild {
    /// No `<time>` child seen yet
    Missing,
    /// Inside the first `<time>` child, collecting its text
    Reading(String),
    /// First `<time>` child closed; later ones are ignored
    Done(Option<OffsetDateTime>),
}

/// A `<trkpt>` element that has been opened but not yet closed
#[derive(Debug)]
struct OpenRecord {
    /// Parsed (lat, lon), `None` when either attribute is missing or unusable
    coordinates: Option<(f64, f64)>,
    /// Number of currently open elements nested inside the track point
    depth: usize,
    time: TimeChild,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Wrap an already-built point sequence, keeping its order
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Parse a GPX file from disk
    ///
    /// # Errors
    /// [`DataError::ReadFile`] if the file cannot be opened,
    /// [`DataError::XmlParse`] if it is not well-formed XML and
    /// [`DataError::EmptyTrack`] if it holds no usable track point.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let track = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} points ({} timed) from {}",
            track.len(),
            track.timed_len(),
            path.display()
        );
        Ok(track)
    }

    /// Parse GPX content from any buffered reader
    ///
    /// Every element with local name `trkpt`, at any depth and under any
    /// namespace prefix, is one record.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::from_reader");

        let mut reader = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut points = Vec::new();
        let mut skipped = 0usize;
        let mut open: Option<OpenRecord> = None;
        // Elements opened but not yet closed, across the whole document
        let mut depth = 0usize;
        let mut root: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => {
                    if depth == 0 {
                        root = Some(String::from_utf8_lossy(element.name().as_ref()).into_owned());
                    }
                    depth += 1;
                    if let Some(record) = open.as_mut() {
                        record.depth += 1;
                        if record.depth == 1
                            && matches!(record.time, TimeChild::Missing)
                            && element.local_name().as_ref() == TIME
                        {
                            record.time = TimeChild::Reading(String::new());
                        }
                    } else if element.local_name().as_ref() == TRKPT {
                        open = Some(OpenRecord::new(read_coordinates(&element)?));
                    }
                }
                Event::Empty(element) => {
                    if let Some(record) = open.as_mut() {
                        // `<time/>` counts as the first time child, with no usable value
                        if record.depth == 0
                            && matches!(record.time, TimeChild::Missing)
                            && element.local_name().as_ref() == TIME
                        {
                            record.time = TimeChild::Done(None);
                        }
                    } else if element.local_name().as_ref() == TRKPT {
                        OpenRecord::new(read_coordinates(&element)?)
                            .finish(&mut points, &mut skipped);
                    }
                }
                Event::Text(text) => {
                    if let Some(text_buf) = open.as_mut().and_then(OpenRecord::time_text) {
                        text_buf.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(text_buf) = open.as_mut().and_then(OpenRecord::time_text) {
                        text_buf.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if let Some(mut record) = open.take() {
                        if record.depth == 0 {
                            record.finish(&mut points, &mut skipped);
                        } else {
                            if record.depth == 1 {
                                if let TimeChild::Reading(text) = &record.time {
                                    let timestamp = utils::parse_timestamp(text);
                                    record.time = TimeChild::Done(timestamp);
                                }
                            }
                            record.depth -= 1;
                            open = Some(record);
                        }
                    }
                }
                Event::Eof => {
                    if depth > 0 || open.is_some() {
                        let tag = root.unwrap_or_default();
                        tracing::debug!("Document ended with {depth} unclosed elements");
                        return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
                            tag,
                        ))
                        .into());
                    }
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        if skipped > 0 {
            tracing::warn!(
                "Skipped {skipped} track points with missing or non-numeric coordinates"
            );
        }
        if points.is_empty() {
            return Err(DataError::EmptyTrack);
        }

        Ok(Self { points })
    }

    /// Build a track from an already-parsed GPX document
    ///
    /// Points of all tracks and segments are concatenated in document order.
    pub fn from_gpx(gpx: &gpx::Gpx) -> Self {
        let points = gpx
            .tracks
            .iter()
            .flat_map(|track| &track.segments)
            .flat_map(|segment| &segment.points)
            .map(|waypoint| {
                let point = waypoint.point();
                GeoPoint::new(
                    point.y(),
                    point.x(),
                    waypoint.time.clone().map(OffsetDateTime::from),
                )
            })
            .collect();
        Self { points }
    }

    /// All points in file order
    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points carrying a usable timestamp
    pub fn timed_len(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.epoch_seconds().is_some())
            .count()
    }

    /// Bounding box in degrees (x = longitude, y = latitude)
    ///
    /// Returns `None` for an empty track.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let first = self.points.first()?;
        let (mut min, mut max) = (first.position().0, first.position().0);
        for point in &self.points[1..] {
            let coord = point.position().0;
            min.x = min.x.min(coord.x);
            min.y = min.y.min(coord.y);
            max.x = max.x.max(coord.x);
            max.y = max.y.max(coord.y);
        }
        Some(Rect::new(Coord { x: min.x, y: min.y }, Coord { x: max.x, y: max.y }))
    }
}

impl OpenRecord {
    fn new(coordinates: Option<(f64, f64)>) -> Self {
        Self {
            coordinates,
            depth: 0,
            time: TimeChild::Missing,
        }
    }

    /// Text buffer of the first `<time>` child, if it is currently open
    fn time_text(&mut self) -> Option<&mut String> {
        match &mut self.time {
            TimeChild::Reading(text) if self.depth == 1 => Some(text),
            _ => None,
        }
    }

    fn finish(self, points: &mut Vec<GeoPoint>, skipped: &mut usize) {
        let Some((lat, lon)) = self.coordinates else {
            tracing::trace!("Skipping track point without usable coordinates");
            *skipped += 1;
            return;
        };
        let timestamp = match self.time {
            TimeChild::Done(timestamp) => timestamp,
            // Unterminated time text cannot occur once the record is closed
            TimeChild::Missing | TimeChild::Reading(_) => None,
        };
        points.push(GeoPoint::new(lat, lon, timestamp));
    }
}

/// Read `lat`/`lon` attributes by local name
fn read_coordinates(element: &BytesStart<'_>) -> Result<Option<(f64, f64)>> {
    let mut lat = None;
    let mut lon = None;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        match attribute.key.local_name().as_ref() {
            b"lat" => lat = parse_coordinate(&attribute.unescape_value()?),
            b"lon" => lon = parse_coordinate(&attribute.unescape_value()?),
            _ => {}
        }
    }
    Ok(lat.zip(lon))
}

#[inline]
fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}
