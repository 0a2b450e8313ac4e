//! Pure view math for the SVG map. No web_sys, so it runs in unit tests.
//!
//! Display coordinates are EPSG:3857 meters with y pointing north. SVG user
//! space uses the same units with y flipped, so a display point `(x, y)` is
//! drawn at `(x, -y)`.
use std::time::Duration;

use fieldmap_shared::extent::Extent;
use fieldmap_shared::renderer::Padding;

/// Resolution used when the fitted extent has no area (a single point).
const MIN_RESOLUTION: f64 = 0.1;

/// Largest share of a container dimension padding may take once it is shrunk.
const MAX_PADDING_SHARE: f64 = 0.5;

/// Visible region in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn to_attr(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }

    /// Map units per screen pixel for a container `container_w` pixels wide.
    #[cfg(test)]
    fn resolution(&self, container_w: f64) -> f64 {
        self.width / container_w
    }
}

/// Scale down `near + far` when it leaves no room on an axis of `size` pixels.
fn shrink_axis(near: f64, far: f64, size: f64) -> (f64, f64) {
    let total = near + far;
    if total < size {
        return (near, far);
    }
    let k = size * MAX_PADDING_SHARE / total;
    (near * k, far * k)
}

/// Padding that leaves a positive inner area in the container.
pub fn usable_padding(padding: &Padding, container_w: f64, container_h: f64) -> Padding {
    let (left, right) = shrink_axis(padding.left, padding.right, container_w);
    let (top, bottom) = shrink_axis(padding.top, padding.bottom, container_h);
    Padding {
        top,
        right,
        bottom,
        left,
    }
}

/// View box that frames `extent` inside the padded container, keeping the
/// container's aspect ratio.
pub fn fit_view_box(
    extent: &Extent,
    padding: &Padding,
    container_w: f64,
    container_h: f64,
) -> Option<ViewBox> {
    if extent.is_empty() || container_w <= 0.0 || container_h <= 0.0 {
        return None;
    }
    let padding = usable_padding(padding, container_w, container_h);
    let inner_w = container_w - padding.left - padding.right;
    let inner_h = container_h - padding.top - padding.bottom;

    let resolution = (extent.width() / inner_w)
        .max(extent.height() / inner_h)
        .max(MIN_RESOLUTION);

    let (center_x, center_y) = extent.center();
    let inner_center_px = (padding.left + inner_w / 2.0, padding.top + inner_h / 2.0);

    Some(ViewBox {
        x: center_x - inner_center_px.0 * resolution,
        y: -center_y - inner_center_px.1 * resolution,
        width: container_w * resolution,
        height: container_h * resolution,
    })
}

/// Convert container-relative pixels to display coordinates.
pub fn container_to_display(
    container_x: f64,
    container_y: f64,
    view: &ViewBox,
    container_w: f64,
    container_h: f64,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 || container_h <= 0.0 {
        return None;
    }
    let svg_x = view.x + container_x * view.width / container_w;
    let svg_y = view.y + container_y * view.height / container_h;
    Some((svg_x, -svg_y))
}

/// Smooth start and stop, `t` in [0, 1].
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn interpolate(from: &ViewBox, to: &ViewBox, t: f64) -> ViewBox {
    let k = ease_in_out(t);
    let lerp = |a: f64, b: f64| a + (b - a) * k;
    ViewBox {
        x: lerp(from.x, to.x),
        y: lerp(from.y, to.y),
        width: lerp(from.width, to.width),
        height: lerp(from.height, to.height),
    }
}

/// An in-flight viewport animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub from: ViewBox,
    pub to: ViewBox,
    pub duration: Duration,
    pub elapsed: Duration,
}

impl Animation {
    pub fn new(from: ViewBox, to: ViewBox, duration: Duration) -> Self {
        Animation {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` and return the view to draw.
    pub fn step(&mut self, dt: Duration) -> ViewBox {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        interpolate(&self.from, &self.to, t)
    }
}
