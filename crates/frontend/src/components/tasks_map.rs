use std::sync::Arc;
use std::time::Duration;

use dioxus::logger::tracing;
use dioxus::prelude::*;
use fieldmap_shared::features::TaskKey;
use fieldmap_shared::models::ProjectBoundarySet;
use fieldmap_shared::renderer::{BoundaryLayerRenderer, RenderOutcome, SkipReason};
use fieldmap_shared::style::StyleTable;

use crate::map_host::SvgMapHost;

/// Animation tick, roughly one frame.
const FRAME_MS: u32 = 16;

/// Used when the container reports no size yet.
const FALLBACK_SIZE: (f64, f64) = (960.0, 640.0);

fn container_class(loading: bool) -> &'static str {
    if loading {
        "tasks-map spinner"
    } else {
        "tasks-map"
    }
}

fn svg_document(host: &SvgMapHost) -> String {
    match host.view() {
        Some(view) => format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}" preserveAspectRatio="none" width="100%" height="100%">{}</svg>"#,
            view.to_attr(),
            host.svg_content()
        ),
        None => String::new(),
    }
}

#[component]
pub fn TasksMap(
    route_id: String,
    boundary_sets: Signal<Vec<ProjectBoundarySet>>,
    selected: Signal<Option<TaskKey>>,
) -> Element {
    let mut selected = selected;
    let mut host = use_signal(|| None::<SvgMapHost>);
    let mut map_ready = use_signal(|| false);
    let mut renderer =
        use_signal(|| BoundaryLayerRenderer::new(Arc::new(StyleTable::task_defaults())));
    let mut outcome = use_signal(|| None::<RenderOutcome>);
    let mut render_error = use_signal(|| None::<String>);
    // Bumped per render so a stale animation loop stops.
    let mut generation = use_signal(|| 0u64);

    use_effect(use_reactive!(|route_id| {
        if !*map_ready.read() {
            return;
        }
        let sets = boundary_sets.read();
        let mut host_guard = host.write();
        let result = renderer
            .write()
            .rebuild(host_guard.as_mut(), &sets, &route_id);
        drop(host_guard);

        match result {
            Ok(rendered @ RenderOutcome::Rendered { .. }) => {
                render_error.set(None);
                outcome.set(Some(rendered));
                let run = *generation.peek() + 1;
                generation.set(run);
                spawn(async move {
                    loop {
                        if *generation.peek() != run {
                            return;
                        }
                        let done = match host.write().as_mut() {
                            Some(h) => h.step_animation(Duration::from_millis(FRAME_MS as u64)),
                            None => true,
                        };
                        if done {
                            break;
                        }
                        gloo_timers::future::TimeoutFuture::new(FRAME_MS).await;
                    }
                    if let Some(h) = host.write().as_mut() {
                        h.finish_render();
                    }
                });
            }
            Ok(skipped) => {
                render_error.set(None);
                outcome.set(Some(skipped));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to render task boundaries");
                render_error.set(Some(e.to_string()));
            }
        }
    }));

    let host_read = host.read();
    let svg_html = host_read.as_ref().map(svg_document).unwrap_or_default();
    let no_tasks = matches!(
        &*outcome.read(),
        Some(RenderOutcome::Skipped(SkipReason::NoTasks))
    );
    let loading = render_error.read().is_none()
        && !no_tasks
        && host_read.as_ref().map_or(true, |h| h.is_loading());
    drop(host_read);

    rsx! {
        div {
            class: container_class(loading),
            onmounted: move |evt: Event<MountedData>| async move {
                let (w, h) = match evt.get_client_rect().await {
                    Ok(rect) if rect.size.width > 0.0 && rect.size.height > 0.0 => {
                        (rect.size.width, rect.size.height)
                    }
                    _ => FALLBACK_SIZE,
                };
                tracing::debug!(width = w, height = h, "Map container mounted");
                host.set(Some(SvgMapHost::new(w, h)));
                map_ready.set(true);
            },
            onclick: move |evt: Event<MouseData>| {
                let p = evt.element_coordinates();
                let hit = host
                    .read()
                    .as_ref()
                    .and_then(|h| h.feature_at_px(p.x, p.y))
                    .map(|f| f.key.clone());
                selected.set(hit);
            },

            div {
                class: "tasks-map-layers",
                dangerous_inner_html: "{svg_html}",
                style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
            }

            if let Some(err) = &*render_error.read() {
                div { class: "map-message error", "Could not draw task boundaries: {err}" }
            } else if no_tasks {
                div { class: "map-message", "This project has no tasks yet." }
            }
        }
    }
}
