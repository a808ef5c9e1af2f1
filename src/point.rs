// Point - one timestamped surveillance sample
//
// Optional kinematic fields are `Option<f64>` and never NaN; the builder
// rejects non-finite values so nothing downstream has to re-check.

use std::cmp::Ordering;

use crate::error::PointError;
use crate::geodesy;

/// An immutable position sample carrying an opaque, format-specific payload
///
/// Units: time in epoch milliseconds, lat/long in degrees, altitude in feet,
/// speed in knots, course in degrees, along-track distance in NM.
#[derive(Debug, Clone)]
pub struct Point<P = ()> {
    time: i64,
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    speed: Option<f64>,
    course: Option<f64>,
    curvature: Option<f64>,
    along_track_distance: Option<f64>,
    track_id: Option<String>,
    payload: P,
}

impl Point<()> {
    pub fn builder() -> PointBuilder<()> {
        PointBuilder::new()
    }
}

impl<P> Point<P> {
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn lat_long(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn course(&self) -> Option<f64> {
        self.course
    }

    pub fn curvature(&self) -> Option<f64> {
        self.curvature
    }

    pub fn along_track_distance(&self) -> Option<f64> {
        self.along_track_distance
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Great-circle distance to another point in NM (altitude ignored)
    pub fn distance_in_nm_to<Q>(&self, other: &Point<Q>) -> f64 {
        geodesy::distance_nm(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Initial course from this point to another, in degrees
    pub fn course_to<Q>(&self, other: &Point<Q>) -> f64 {
        geodesy::course_deg(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Reopens this point as a builder with every field preset
    pub fn into_builder(self) -> PointBuilder<P> {
        PointBuilder {
            time: Some(self.time),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            altitude: self.altitude,
            speed: self.speed,
            course: self.course,
            curvature: self.curvature,
            along_track_distance: self.along_track_distance,
            track_id: self.track_id,
            payload: self.payload,
        }
    }

    // In-place edits. Only the pipeline's working track reaches these.

    pub(crate) fn set_time(&mut self, time: i64) {
        self.time = time;
    }

    pub(crate) fn set_lat_long(&mut self, latitude: f64, longitude: f64) {
        self.latitude = latitude;
        self.longitude = longitude;
    }

    pub(crate) fn set_altitude(&mut self, altitude: Option<f64>) {
        self.altitude = altitude.filter(|a| a.is_finite());
    }

    pub(crate) fn set_speed(&mut self, speed: Option<f64>) {
        self.speed = speed.filter(|s| s.is_finite());
    }

    pub(crate) fn set_course(&mut self, course: Option<f64>) {
        self.course = course.filter(|c| c.is_finite()).map(geodesy::normalize_course);
    }

    fn sort_key_cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.latitude.total_cmp(&other.latitude))
            .then_with(|| self.longitude.total_cmp(&other.longitude))
            .then_with(|| cmp_optional(self.altitude, other.altitude))
            .then_with(|| cmp_optional(self.speed, other.speed))
            .then_with(|| cmp_optional(self.course, other.course))
            .then_with(|| self.track_id.cmp(&other.track_id))
    }
}

fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Points order by time first. The remaining fields break ties so sorted
// containers keep simultaneous reports apart. The payload never participates.
impl<P> PartialEq for Point<P> {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key_cmp(other) == Ordering::Equal
    }
}

impl<P> Eq for Point<P> {}

impl<P> PartialOrd for Point<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Point<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key_cmp(other)
    }
}

/// Builder for [`Point`]. Time, latitude and longitude are required.
#[derive(Debug, Clone)]
pub struct PointBuilder<P = ()> {
    time: Option<i64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
    speed: Option<f64>,
    course: Option<f64>,
    curvature: Option<f64>,
    along_track_distance: Option<f64>,
    track_id: Option<String>,
    payload: P,
}

impl Default for PointBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl PointBuilder<()> {
    pub fn new() -> Self {
        PointBuilder {
            time: None,
            latitude: None,
            longitude: None,
            altitude: None,
            speed: None,
            course: None,
            curvature: None,
            along_track_distance: None,
            track_id: None,
            payload: (),
        }
    }
}

impl<P> PointBuilder<P> {
    pub fn time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn lat_long(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn altitude(mut self, feet: f64) -> Self {
        self.altitude = Some(feet);
        self
    }

    pub fn maybe_altitude(mut self, feet: Option<f64>) -> Self {
        self.altitude = feet;
        self
    }

    pub fn speed(mut self, knots: f64) -> Self {
        self.speed = Some(knots);
        self
    }

    pub fn maybe_speed(mut self, knots: Option<f64>) -> Self {
        self.speed = knots;
        self
    }

    pub fn course(mut self, degrees: f64) -> Self {
        self.course = Some(degrees);
        self
    }

    pub fn maybe_course(mut self, degrees: Option<f64>) -> Self {
        self.course = degrees;
        self
    }

    pub fn curvature(mut self, curvature: f64) -> Self {
        self.curvature = Some(curvature);
        self
    }

    pub fn along_track_distance(mut self, nm: f64) -> Self {
        self.along_track_distance = Some(nm);
        self
    }

    pub fn track_id(mut self, id: impl Into<String>) -> Self {
        self.track_id = Some(id.into());
        self
    }

    pub fn maybe_track_id(mut self, id: Option<String>) -> Self {
        self.track_id = id;
        self
    }

    /// Swaps the payload, changing the builder's payload type
    pub fn payload<Q>(self, payload: Q) -> PointBuilder<Q> {
        PointBuilder {
            time: self.time,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            speed: self.speed,
            course: self.course,
            curvature: self.curvature,
            along_track_distance: self.along_track_distance,
            track_id: self.track_id,
            payload,
        }
    }

    pub fn build(self) -> Result<Point<P>, PointError> {
        let time = self.time.ok_or(PointError::MissingField("time"))?;
        let latitude = finite("latitude", self.latitude.ok_or(PointError::MissingField("latitude"))?)?;
        let longitude = finite("longitude", self.longitude.ok_or(PointError::MissingField("longitude"))?)?;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PointError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(PointError::LongitudeOutOfRange(longitude));
        }

        Ok(Point {
            time,
            latitude,
            longitude,
            altitude: finite_opt("altitude", self.altitude)?,
            speed: finite_opt("speed", self.speed)?,
            course: finite_opt("course", self.course)?.map(geodesy::normalize_course),
            curvature: finite_opt("curvature", self.curvature)?,
            along_track_distance: finite_opt("along_track_distance", self.along_track_distance)?,
            track_id: self.track_id,
            payload: self.payload,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, PointError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PointError::NonFinite { field, value })
    }
}

fn finite_opt(field: &'static str, value: Option<f64>) -> Result<Option<f64>, PointError> {
    value.map(|v| finite(field, v)).transpose()
}
