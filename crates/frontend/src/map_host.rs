use std::time::Duration;

use dioxus::logger::tracing;

use fieldmap_shared::extent::Extent;
use fieldmap_shared::features::MapFeature;
use fieldmap_shared::renderer::{FitOptions, LayerId, MapHost, RenderCompleteCallback, VectorLayer};
use fieldmap_shared::style::Style;
use geo::{LineString, Polygon};

use crate::viewport::{self, Animation, ViewBox};

/// Outline for features whose status has no style.
const FALLBACK_STROKE: &str = "rgba(90,90,90,0.9)";

/// In-memory map backing the SVG task view.
pub struct SvgMapHost {
    next_layer: u64,
    layers: Vec<(LayerId, VectorLayer)>,
    container_w: f64,
    container_h: f64,
    view: Option<ViewBox>,
    animation: Option<Animation>,
    loading: bool,
    pending: Vec<RenderCompleteCallback<SvgMapHost>>,
}

impl SvgMapHost {
    /// A host starts out loading until its first render cycle completes.
    pub fn new(container_w: f64, container_h: f64) -> Self {
        SvgMapHost {
            next_layer: 0,
            layers: Vec::new(),
            container_w,
            container_h,
            view: None,
            animation: None,
            loading: true,
            pending: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> Option<ViewBox> {
        self.view
    }

    /// Advance the viewport animation. Returns true once nothing is left to animate.
    pub fn step_animation(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return true;
        };
        self.view = Some(animation.step(dt));
        if animation.is_done() {
            self.animation = None;
        }
        self.animation.is_none()
    }

    /// End of a render cycle: run the callbacks registered for it.
    pub fn finish_render(&mut self) {
        for callback in std::mem::take(&mut self.pending) {
            callback(self);
        }
    }

    /// Topmost feature under a container-relative pixel.
    pub fn feature_at_px(&self, px: f64, py: f64) -> Option<&MapFeature> {
        let view = self.view?;
        let (x, y) = viewport::container_to_display(px, py, &view, self.container_w, self.container_h)?;
        self.layers
            .iter()
            .rev()
            .find_map(|(_, layer)| layer.feature_at(x, y))
    }

    /// SVG body for every layer, bottom to top.
    pub fn svg_content(&self) -> String {
        let mut svg = String::with_capacity(4096);
        for (id, layer) in &self.layers {
            svg.push_str(&format!(r#"<g data-layer="{}">"#, id.0));
            for (feature, style) in layer.styled_features() {
                push_feature(&mut svg, feature, style);
            }
            svg.push_str("</g>");
        }
        svg
    }
}

#[cfg(test)]
impl SvgMapHost {
    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn is_animating(&self) -> bool {
        self.animation.is_some()
    }
}

impl MapHost for SvgMapHost {
    fn add_layer(&mut self, layer: VectorLayer) -> LayerId {
        self.next_layer += 1;
        let id = LayerId(self.next_layer);
        // Stable: later layers stay above earlier ones with the same z-index.
        let at = self
            .layers
            .iter()
            .position(|(_, l)| l.z_index() > layer.z_index())
            .unwrap_or(self.layers.len());
        self.layers.insert(at, (id, layer));
        id
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|(layer_id, _)| *layer_id != id);
        self.layers.len() != before
    }

    fn fit_view(&mut self, extent: Extent, options: FitOptions) {
        let Some(target) =
            viewport::fit_view_box(&extent, &options.padding, self.container_w, self.container_h)
        else {
            tracing::warn!(?extent, "Cannot fit view to extent");
            return;
        };
        match self.view {
            Some(current) => {
                self.animation = Some(Animation::new(current, target, options.duration));
            }
            None => {
                self.view = Some(target);
                self.animation = None;
            }
        }
    }

    fn clear_loading_indicator(&mut self) {
        self.loading = false;
    }

    fn once_render_complete(&mut self, callback: RenderCompleteCallback<Self>) {
        self.pending.push(callback);
    }
}

fn push_feature(svg: &mut String, feature: &MapFeature, style: Option<&Style>) {
    let mut d = String::new();
    for polygon in &feature.geometry {
        push_polygon_path(&mut d, polygon);
    }
    let (fill, stroke, width, dash) = match style {
        Some(s) => (s.fill.to_css(), s.stroke.to_css(), s.stroke_width, ""),
        None => (
            "none".to_string(),
            FALLBACK_STROKE.to_string(),
            1.0,
            r#" stroke-dasharray="4 3""#,
        ),
    };
    svg.push_str(&format!(
        r#"<path data-task="{}" d="{d}" fill="{fill}" fill-rule="evenodd" stroke="{stroke}" stroke-width="{width}" vector-effect="non-scaling-stroke"{dash}><title>Task {} ({})</title></path>"#,
        feature.key.id,
        feature.key.id,
        feature.key.status.display_name(),
    ));
}

fn push_polygon_path(d: &mut String, polygon: &Polygon<f64>) {
    push_ring(d, polygon.exterior());
    for interior in polygon.interiors() {
        push_ring(d, interior);
    }
}

fn push_ring(d: &mut String, ring: &LineString<f64>) {
    for (i, c) in ring.coords().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{}{} {} ", cmd, c.x, -c.y));
    }
    d.push('Z');
}
