//! Task boundary layer rendering.
//!
//! [`BoundaryLayerRenderer::rebuild`] turns one project's task records into a
//! styled [`VectorLayer`], fits the host view to the layer's extent and hands
//! the layer to the host. The host is anything implementing [`MapHost`].
use std::sync::Arc;
use std::time::Duration;

use crate::error::FeatureError;
use crate::extent::Extent;
use crate::features::{build_feature_collection, read_features, MapFeature};
use crate::models::{find_project, ProjectBoundarySet};
use crate::projection::Projection;
use crate::route::decode_project_id;
use crate::style::{Style, StyleTable};

/// Handle of a layer added to a [`MapHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// View padding in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub duration: Duration,
    pub padding: Padding,
}

impl Default for FitOptions {
    fn default() -> Self {
        // Left side leaves room for the project side panel.
        FitOptions {
            duration: Duration::from_millis(2000),
            padding: Padding {
                top: 50.0,
                right: 50.0,
                bottom: 50.0,
                left: 200.0,
            },
        }
    }
}

/// Features plus their resolved styles, ready for a host to draw.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    features: Vec<MapFeature>,
    styles: Vec<Option<Style>>,
    z_index: i32,
}

impl VectorLayer {
    /// Resolves every feature's style once; misses are logged by the table.
    pub fn new(features: Vec<MapFeature>, table: &StyleTable, z_index: i32) -> Self {
        let styles = features
            .iter()
            .map(|f| table.style_for(&f.key).copied())
            .collect();
        VectorLayer {
            features,
            styles,
            z_index,
        }
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn styled_features(&self) -> impl Iterator<Item = (&MapFeature, Option<&Style>)> {
        self.features
            .iter()
            .zip(self.styles.iter().map(Option::as_ref))
    }

    /// Topmost feature containing the display coordinate.
    pub fn feature_at(&self, x: f64, y: f64) -> Option<&MapFeature> {
        self.features.iter().rev().find(|f| f.contains(x, y))
    }

    pub fn extent(&self) -> Extent {
        Extent::of_features(&self.features)
    }
}

pub type RenderCompleteCallback<H> = Box<dyn FnOnce(&mut H)>;

/// The map the renderer draws into.
pub trait MapHost {
    /// Add a layer above existing ones at its z-index.
    fn add_layer(&mut self, layer: VectorLayer) -> LayerId;

    /// Returns false if the layer was not present.
    fn remove_layer(&mut self, id: LayerId) -> bool;

    /// Animate the viewport to frame `extent`.
    fn fit_view(&mut self, extent: Extent, options: FitOptions);

    fn clear_loading_indicator(&mut self);

    /// Run `callback` once, the next time the host finishes a render cycle.
    fn once_render_complete(&mut self, callback: RenderCompleteCallback<Self>)
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub fit: FitOptions,
    pub z_index: i32,
    pub projection: Projection,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            fit: FitOptions::default(),
            z_index: 10,
            projection: Projection::WebMercator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoBoundarySets,
    NoMapHost,
    UnknownProject,
    NoTasks,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Skipped(SkipReason),
    Rendered {
        layer: LayerId,
        features: usize,
        extent: Extent,
    },
}

/// Owns at most one layer on the host at a time.
pub struct BoundaryLayerRenderer {
    styles: Arc<StyleTable>,
    options: RenderOptions,
    current_layer: Option<LayerId>,
}

impl BoundaryLayerRenderer {
    pub fn new(styles: Arc<StyleTable>) -> Self {
        Self::with_options(styles, RenderOptions::default())
    }

    pub fn with_options(styles: Arc<StyleTable>, options: RenderOptions) -> Self {
        BoundaryLayerRenderer {
            styles,
            options,
            current_layer: None,
        }
    }

    pub fn current_layer(&self) -> Option<LayerId> {
        self.current_layer
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Re-render the project named by `route_param` from scratch.
    ///
    /// Does nothing unless there is boundary data, a host, and a project whose
    /// id matches the decoded route parameter. Geometry errors propagate
    /// before the host is touched.
    pub fn rebuild<H: MapHost + 'static>(
        &mut self,
        host: Option<&mut H>,
        boundary_sets: &[ProjectBoundarySet],
        route_param: &str,
    ) -> Result<RenderOutcome, FeatureError> {
        if boundary_sets.is_empty() {
            return Ok(RenderOutcome::Skipped(SkipReason::NoBoundarySets));
        }
        let Some(host) = host else {
            return Ok(RenderOutcome::Skipped(SkipReason::NoMapHost));
        };
        let project_id = match decode_project_id(route_param) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(route_param, error = %e, "Route does not name a project");
                return Ok(RenderOutcome::Skipped(SkipReason::UnknownProject));
            }
        };
        match find_project(boundary_sets, project_id) {
            Some(project) => self.render_project(host, project),
            None => Ok(RenderOutcome::Skipped(SkipReason::UnknownProject)),
        }
    }

    pub fn render_project<H: MapHost + 'static>(
        &mut self,
        host: &mut H,
        project: &ProjectBoundarySet,
    ) -> Result<RenderOutcome, FeatureError> {
        let collection = build_feature_collection(project);
        let features = read_features(&collection, self.options.projection)?;
        let extent = Extent::of_features(&features);

        if features.is_empty() || extent.is_empty() {
            self.detach(host);
            tracing::debug!(project_id = project.id, "Project has no task boundaries");
            return Ok(RenderOutcome::Skipped(SkipReason::NoTasks));
        }

        host.fit_view(extent, self.options.fit);

        self.detach(host);
        let count = features.len();
        let layer = host.add_layer(VectorLayer::new(features, &self.styles, self.options.z_index));
        self.current_layer = Some(layer);

        host.once_render_complete(Box::new(|host: &mut H| host.clear_loading_indicator()));

        tracing::info!(
            project_id = project.id,
            features = count,
            layer = layer.0,
            projection = self.options.projection.code(),
            "Rendered task boundaries"
        );

        Ok(RenderOutcome::Rendered {
            layer,
            features: count,
            extent,
        })
    }

    /// Remove the layer this renderer added last, if any.
    pub fn detach<H: MapHost>(&mut self, host: &mut H) {
        if let Some(layer) = self.current_layer.take() {
            if !host.remove_layer(layer) {
                tracing::debug!(layer = layer.0, "Previous task layer already gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{project, square, task};
    use crate::features::TaskKey;
    use crate::models::TaskStatus;
    use crate::route::encode_project_id;
    use crate::style::Rgba;

    #[derive(Default)]
    struct FakeHost {
        next_id: u64,
        layers: Vec<(LayerId, VectorLayer)>,
        fits: Vec<(Extent, FitOptions)>,
        loading: bool,
        pending: Vec<RenderCompleteCallback<FakeHost>>,
    }

    impl FakeHost {
        fn loading() -> Self {
            FakeHost {
                loading: true,
                ..Default::default()
            }
        }

        fn finish_render(&mut self) {
            for callback in std::mem::take(&mut self.pending) {
                callback(self);
            }
        }

        fn only_layer(&self) -> &VectorLayer {
            assert_eq!(self.layers.len(), 1);
            &self.layers[0].1
        }
    }

    impl MapHost for FakeHost {
        fn add_layer(&mut self, layer: VectorLayer) -> LayerId {
            self.next_id += 1;
            let id = LayerId(self.next_id);
            self.layers.push((id, layer));
            id
        }

        fn remove_layer(&mut self, id: LayerId) -> bool {
            let before = self.layers.len();
            self.layers.retain(|(layer_id, _)| *layer_id != id);
            self.layers.len() != before
        }

        fn fit_view(&mut self, extent: Extent, options: FitOptions) {
            self.fits.push((extent, options));
        }

        fn clear_loading_indicator(&mut self) {
            self.loading = false;
        }

        fn once_render_complete(&mut self, callback: RenderCompleteCallback<Self>) {
            self.pending.push(callback);
        }
    }

    fn style(r: u8) -> Style {
        Style {
            fill: Rgba::new(r, 0, 0, 1.0),
            stroke: Rgba::new(0, 0, 0, 1.0),
            stroke_width: 1.0,
        }
    }

    fn two_status_table() -> Arc<StyleTable> {
        let mut table = StyleTable::new();
        table.insert(TaskStatus::Ready, style(1));
        table.insert(TaskStatus::LockedForMapping, style(2));
        Arc::new(table)
    }

    fn sample_sets() -> Vec<ProjectBoundarySet> {
        vec![
            project(1, vec![task(10, TaskStatus::Ready, square(0.0, 0.0, 1.0))]),
            project(
                12,
                vec![
                    task(42, TaskStatus::Ready, square(85.30, 27.70, 0.01)),
                    task(43, TaskStatus::LockedForMapping, square(85.31, 27.69, 0.01)),
                ],
            ),
        ]
    }

    #[test]
    fn test_renders_matching_project() {
        let mut host = FakeHost::loading();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let outcome = renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(12))
            .unwrap();

        let RenderOutcome::Rendered { layer, features, extent } = outcome.clone() else {
            panic!("expected a render, got {outcome:?}");
        };
        assert_eq!(features, 2);
        assert_eq!(renderer.current_layer(), Some(layer));
        assert_eq!(host.only_layer().z_index(), 10);
        assert_eq!(host.fits, vec![(extent, FitOptions::default())]);
        assert_eq!(host.fits[0].1.padding.left, 200.0);
        assert_eq!(host.fits[0].1.duration, Duration::from_millis(2000));
    }

    #[test]
    fn test_extent_bounds_every_feature() {
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(12))
            .unwrap();

        let (extent, _) = host.fits[0];
        for feature in host.only_layer().features() {
            let rect = feature.bounding_rect().unwrap();
            assert!(extent.min_x <= rect.min().x && extent.min_y <= rect.min().y);
            assert!(extent.max_x >= rect.max().x && extent.max_y >= rect.max().y);
        }
    }

    #[test]
    fn test_styles_follow_status() {
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(12))
            .unwrap();

        let styled: Vec<_> = host.only_layer().styled_features().collect();
        assert_eq!(styled[0].0.key, TaskKey::new(42, TaskStatus::Ready));
        assert_eq!(styled[0].0.key.composite_id(), "42_READY");
        assert_eq!(styled[0].1, Some(&style(1)));
        assert_eq!(styled[1].1, Some(&style(2)));
    }

    #[test]
    fn test_unknown_status_has_no_style() {
        let sets = vec![project(
            5,
            vec![task(1, TaskStatus::Unknown("PENDING".into()), square(0.0, 0.0, 1.0))],
        )];
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(5))
            .unwrap();
        let styled: Vec<_> = host.only_layer().styled_features().collect();
        assert_eq!(styled[0].1, None);
    }

    #[test]
    fn test_loading_indicator_clears_after_render_cycle() {
        let mut host = FakeHost::loading();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(12))
            .unwrap();

        assert!(host.loading);
        host.finish_render();
        assert!(!host.loading);
        assert!(host.pending.is_empty());
    }

    #[test]
    fn test_unknown_project_is_noop() {
        let mut host = FakeHost::loading();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let outcome = renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(99))
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::UnknownProject));
        assert!(host.layers.is_empty());
        assert!(host.fits.is_empty());
        assert!(host.pending.is_empty());
    }

    #[test]
    fn test_undecodable_route_is_noop() {
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let outcome = renderer
            .rebuild(Some(&mut host), &sample_sets(), "not base64!")
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::UnknownProject));
        assert!(host.layers.is_empty());
    }

    #[test]
    fn test_requires_data_and_host() {
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let outcome = renderer
            .rebuild(Some(&mut host), &[], &encode_project_id(12))
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoBoundarySets));

        let outcome = renderer
            .rebuild(None::<&mut FakeHost>, &sample_sets(), &encode_project_id(12))
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoMapHost));
    }

    #[test]
    fn test_empty_project_never_fits() {
        let sets = vec![project(3, vec![])];
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let outcome = renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(3))
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoTasks));
        assert!(host.fits.is_empty());
        assert!(host.layers.is_empty());
    }

    #[test]
    fn test_repeated_rebuild_keeps_one_layer() {
        let sets = sample_sets();
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(12))
            .unwrap();
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(12))
            .unwrap();

        assert_eq!(host.layers.len(), 1);
        assert_eq!(Some(host.layers[0].0), renderer.current_layer());
        assert_eq!(host.fits.len(), 2);
    }

    #[test]
    fn test_status_change_restyles_on_rebuild() {
        let mut table = StyleTable::new();
        table.insert(TaskStatus::Unknown("PENDING".into()), style(3));
        table.insert(TaskStatus::Ready, style(1));
        let mut renderer = BoundaryLayerRenderer::new(Arc::new(table));

        let mut sets = vec![project(
            7,
            vec![task(1, TaskStatus::Unknown("PENDING".into()), square(0.0, 0.0, 1.0))],
        )];
        let mut host = FakeHost::default();
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(7))
            .unwrap();
        assert_eq!(host.only_layer().styled_features().next().unwrap().1, Some(&style(3)));

        sets[0].task_boundaries[0].status = TaskStatus::Ready;
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(7))
            .unwrap();
        let (feature, styled) = host.only_layer().styled_features().next().unwrap();
        assert_eq!(feature.key.status, TaskStatus::Ready);
        assert_eq!(styled, Some(&style(1)));
    }

    #[test]
    fn test_emptied_project_removes_previous_layer() {
        let mut sets = sample_sets();
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(12))
            .unwrap();
        assert_eq!(host.layers.len(), 1);

        sets[1].task_boundaries.clear();
        renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(12))
            .unwrap();
        assert!(host.layers.is_empty());
        assert!(renderer.current_layer().is_none());
    }

    #[test]
    fn test_geometry_error_leaves_host_untouched() {
        let mut broken = task(8, TaskStatus::Ready, square(0.0, 0.0, 1.0));
        broken.outline.geometry = None;
        let sets = vec![project(2, vec![broken])];
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::new(two_status_table());
        let err = renderer
            .rebuild(Some(&mut host), &sets, &encode_project_id(2))
            .unwrap_err();
        assert_eq!(err, FeatureError::MissingGeometry { task_id: 8 });
        assert!(host.fits.is_empty());
        assert!(host.layers.is_empty());
    }

    #[test]
    fn test_feature_at_hits_task() {
        let mut host = FakeHost::default();
        let mut renderer = BoundaryLayerRenderer::with_options(
            two_status_table(),
            RenderOptions {
                projection: Projection::Geographic,
                ..RenderOptions::default()
            },
        );
        renderer
            .rebuild(Some(&mut host), &sample_sets(), &encode_project_id(1))
            .unwrap();
        let layer = host.only_layer();
        assert_eq!(layer.feature_at(0.5, 0.5).map(|f| f.key.id), Some(10));
        assert!(layer.feature_at(5.0, 5.0).is_none());
    }
}
