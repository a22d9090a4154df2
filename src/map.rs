//! Camera model for the connection map: where the view is centered, how far it is zoomed
//! out, and how it moves between locations.

/// Distance of the camera from the globe center, 1.0 is the surface.
pub const CONNECTED_ZOOM: f64 = 1.35;
pub const DISCONNECTED_ZOOM: f64 = 1.45;

/// Longer animations zoom out and back in instead of zooming directly.
pub const OUT_IN_BREAKPOINT: f64 = 1.7;
pub const ZOOM_OUT_FACTOR: f64 = 1.15;
pub const MAX_ZOOM_OUT: f64 = DISCONNECTED_ZOOM * ZOOM_OUT_FACTOR;

pub const MIN_ANIMATION_SECONDS: f64 = 1.3;
pub const MAX_ANIMATION_SECONDS: f64 = 2.5;

/// Degrees of travel per second of animation.
const DEGREES_PER_SECOND: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    fn add_scaled(self, path: Coordinate, scale: f64) -> Self {
        Self {
            longitude: self.longitude + path.longitude * scale,
            latitude: self.latitude + path.latitude * scale,
        }
    }

    fn length(self) -> f64 {
        self.longitude.hypot(self.latitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStyle {
    Secure,
    Unsecure,
}

impl MarkerStyle {
    pub fn zoom(self) -> f64 {
        match self {
            Self::Secure => CONNECTED_ZOOM,
            Self::Unsecure => DISCONNECTED_ZOOM,
        }
    }
}

pub fn smoothstep(ratio: f64) -> f64 {
    let ratio = ratio.clamp(0.0, 1.0);
    ratio * ratio * (3.0 - 2.0 * ratio)
}

/// Path between two coordinates going the short way around the globe.
pub fn shortest_path(from: Coordinate, to: Coordinate) -> Coordinate {
    let mut longitude = to.longitude - from.longitude;
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }
    Coordinate::new(longitude, to.latitude - from.latitude)
}

pub fn animation_duration(path: Coordinate) -> f64 {
    (path.length() / DEGREES_PER_SECOND).clamp(MIN_ANIMATION_SECONDS, MAX_ANIMATION_SECONDS)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomAnimation {
    Direct { start: f64, end: f64 },
    OutIn { start: f64, middle: f64, end: f64 },
}

impl ZoomAnimation {
    pub fn new(start: f64, end: f64, duration: f64) -> Self {
        if duration > OUT_IN_BREAKPOINT {
            Self::OutIn {
                start,
                middle: (start.max(end) * ZOOM_OUT_FACTOR).min(MAX_ZOOM_OUT),
                end,
            }
        } else {
            Self::Direct { start, end }
        }
    }

    /// Zoom at a linear progress ratio between 0 and 1.
    pub fn zoom_at(&self, ratio: f64) -> f64 {
        let ratio = ratio.clamp(0.0, 1.0);
        match *self {
            Self::Direct { start, end } => start + smoothstep(ratio) * (end - start),
            Self::OutIn { start, middle, end } => {
                if ratio <= 0.5 {
                    start + smoothstep(ratio * 2.0) * (middle - start)
                } else {
                    middle - smoothstep((ratio - 0.5) * 2.0) * (middle - end)
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Animation {
    start_time: f64,
    duration: f64,
    start: Coordinate,
    path: Coordinate,
    zoom: ZoomAnimation,
}

impl Animation {
    fn ratio(&self, now: f64) -> f64 {
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }
}

/// Camera and marker state. Times are seconds on any monotonic clock.
#[derive(Clone, Debug, PartialEq)]
pub struct MapCamera {
    coordinate: Coordinate,
    zoom: f64,
    target: Coordinate,
    marker: MarkerStyle,
    animation: Option<Animation>,
}

impl MapCamera {
    pub fn new(coordinate: Coordinate, marker: MarkerStyle) -> Self {
        Self {
            coordinate,
            zoom: marker.zoom(),
            target: coordinate,
            marker,
            animation: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Where the marker is drawn; the camera catches up with it.
    pub fn target(&self) -> Coordinate {
        self.target
    }

    pub fn marker(&self) -> MarkerStyle {
        self.marker
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_location(&mut self, coordinate: Coordinate, marker: MarkerStyle, now: f64) {
        self.update(now);
        let end_zoom = marker.zoom();
        let animation = if coordinate != self.target {
            let path = shortest_path(self.coordinate, coordinate);
            let duration = animation_duration(path);
            Animation {
                start_time: now,
                duration,
                start: self.coordinate,
                path,
                zoom: ZoomAnimation::new(self.zoom, end_zoom, duration),
            }
        } else {
            // Same place: only the zoom changes, finishing together with any running move.
            let (remaining_path, duration) = match &self.animation {
                Some(running) => (
                    shortest_path(self.coordinate, self.target),
                    (running.start_time + running.duration - now).max(MIN_ANIMATION_SECONDS),
                ),
                None => (Coordinate::default(), MIN_ANIMATION_SECONDS),
            };
            Animation {
                start_time: now,
                duration,
                start: self.coordinate,
                path: remaining_path,
                zoom: ZoomAnimation::Direct {
                    start: self.zoom,
                    end: end_zoom,
                },
            }
        };
        self.animation = Some(animation);
        self.target = coordinate;
        self.marker = marker;
    }

    /// Advances the camera to `now`. Returns true while an animation is still running.
    pub fn update(&mut self, now: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let ratio = animation.ratio(now);
        self.coordinate = animation
            .start
            .add_scaled(animation.path, smoothstep(ratio));
        self.zoom = animation.zoom.zoom_at(ratio);
        if ratio >= 1.0 {
            self.coordinate = self.target;
            self.animation = None;
            return false;
        }
        true
    }
}

/// Projects a coordinate onto a flat map of the given size centered on the camera, with
/// a wider view the further the camera is zoomed out.
pub fn project(camera: &MapCamera, point: Coordinate, width: f32, height: f32) -> (f32, f32) {
    let visible_degrees = 60.0 * (camera.zoom() - 1.0) / (DISCONNECTED_ZOOM - 1.0);
    let scale = f64::from(width) / visible_degrees.max(1.0);
    let offset = shortest_path(camera.coordinate(), point);
    let x = f64::from(width) / 2.0 + offset.longitude * scale;
    let y = f64::from(height) / 2.0 - offset.latitude * scale;
    (x as f32, y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(lhs: f64, rhs: f64) -> bool {
        (lhs - rhs).abs() < 1e-9
    }

    #[test]
    fn smoothstep_eases_in_and_out() {
        assert!(close(smoothstep(0.0), 0.0));
        assert!(close(smoothstep(0.5), 0.5));
        assert!(close(smoothstep(1.0), 1.0));
        assert!(smoothstep(0.1) < 0.1);
    }

    #[test]
    fn duration_is_clamped() {
        assert!(close(animation_duration(Coordinate::new(1.0, 0.0)), MIN_ANIMATION_SECONDS));
        assert!(close(animation_duration(Coordinate::new(40.0, 0.0)), 2.0));
        assert!(close(animation_duration(Coordinate::new(170.0, 30.0)), MAX_ANIMATION_SECONDS));
    }

    #[test]
    fn shortest_path_wraps_the_date_line() {
        let path = shortest_path(Coordinate::new(170.0, 0.0), Coordinate::new(-170.0, 0.0));
        assert!(close(path.longitude, 20.0));
    }

    #[test]
    fn long_animations_zoom_out_and_in() {
        let zoom = ZoomAnimation::new(CONNECTED_ZOOM, CONNECTED_ZOOM, 2.0);
        let ZoomAnimation::OutIn { middle, .. } = zoom else {
            panic!("expected out-in zoom");
        };
        assert!(close(middle, CONNECTED_ZOOM * ZOOM_OUT_FACTOR));
        assert!(close(zoom.zoom_at(0.5), middle));
        assert!(close(zoom.zoom_at(1.0), CONNECTED_ZOOM));

        let capped = ZoomAnimation::new(DISCONNECTED_ZOOM * 1.1, CONNECTED_ZOOM, 2.0);
        let ZoomAnimation::OutIn { middle, .. } = capped else {
            panic!("expected out-in zoom");
        };
        assert!(close(middle, MAX_ZOOM_OUT));

        assert!(matches!(
            ZoomAnimation::new(CONNECTED_ZOOM, DISCONNECTED_ZOOM, 1.5),
            ZoomAnimation::Direct { .. }
        ));
    }

    #[test]
    fn camera_reaches_target_and_zoom() {
        let mut camera = MapCamera::new(Coordinate::new(18.0, 59.0), MarkerStyle::Unsecure);
        assert!(close(camera.zoom(), DISCONNECTED_ZOOM));
        camera.set_location(Coordinate::new(-74.0, 40.7), MarkerStyle::Secure, 10.0);
        assert!(camera.update(11.0));
        assert!(!camera.update(20.0));
        assert_eq!(camera.coordinate(), Coordinate::new(-74.0, 40.7));
        assert!(close(camera.zoom(), CONNECTED_ZOOM));
    }

    #[test]
    fn same_location_only_changes_zoom() {
        let start = Coordinate::new(12.0, 57.7);
        let mut camera = MapCamera::new(start, MarkerStyle::Unsecure);
        camera.set_location(start, MarkerStyle::Secure, 0.0);
        camera.update(0.65);
        assert_eq!(camera.coordinate(), start);
        assert!(camera.zoom() < DISCONNECTED_ZOOM && camera.zoom() > CONNECTED_ZOOM);
        camera.update(MIN_ANIMATION_SECONDS);
        assert!(close(camera.zoom(), CONNECTED_ZOOM));
    }

    #[test]
    fn camera_center_projects_to_view_center() {
        let camera = MapCamera::new(Coordinate::new(12.0, 57.7), MarkerStyle::Secure);
        assert_eq!(project(&camera, camera.coordinate(), 320.0, 200.0), (160.0, 100.0));
    }
}
