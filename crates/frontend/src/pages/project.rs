use dioxus::prelude::*;
use fieldmap_shared::features::TaskKey;
use fieldmap_shared::models::{find_project, ProjectBoundarySet};
use fieldmap_shared::route::decode_project_id;

use crate::api;
use crate::components::status_legend::StatusLegend;
use crate::components::task_panel::TaskPanel;
use crate::components::tasks_map::TasksMap;
use crate::Route;

#[component]
pub fn ProjectTasks(route_id: String) -> Element {
    let mut refresh = use_signal(|| 0u64);
    let mut boundary_sets = use_signal(Vec::<ProjectBoundarySet>::new);
    let selected = use_signal(|| None::<TaskKey>);

    let loader = use_resource(move || {
        let _ = *refresh.read();
        async move { api::fetch_task_boundaries(None).await }
    });

    use_effect(move || {
        if let Some(Ok(sets)) = &*loader.read() {
            boundary_sets.set(sets.clone());
        }
    });

    let project_id = decode_project_id(&route_id);
    let project_name = match &project_id {
        Ok(pid) => find_project(&boundary_sets.read(), *pid)
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        Err(_) => String::new(),
    };
    let load_error = match &*loader.read() {
        Some(Err(e)) => Some(e.clone()),
        _ => None,
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                Link { to: Route::Home {}, class: "back", "Projects" }
                h1 { "{project_name}" }
            }

            div { class: "sidebar",
                match &project_id {
                    Ok(pid) => rsx! {
                        TaskPanel {
                            project_id: *pid,
                            route_key: route_id.clone(),
                            selected: selected,
                            on_updated: move |_| refresh += 1,
                        }
                    },
                    Err(e) => rsx! {
                        div { class: "panel",
                            p { class: "error", "{e}" }
                        }
                    },
                }
                StatusLegend {}
            }

            div { class: "map-area",
                if let Some(e) = load_error {
                    p { class: "error", "Could not load task boundaries: {e}" }
                }
                TasksMap {
                    route_id: route_id.clone(),
                    boundary_sets: boundary_sets,
                    selected: selected,
                }
            }
        }
    }
}
