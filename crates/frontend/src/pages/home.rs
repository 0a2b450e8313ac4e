use dioxus::prelude::*;

use crate::api;
use crate::Route;

#[component]
pub fn ProjectList() -> Element {
    let projects = use_resource(|| api::fetch_projects());

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Field Mapping Tasks" }
            }
            div { class: "content",
                match &*projects.read() {
                    None => rsx! { div { class: "spinner page-spinner" } },
                    Some(Err(e)) => rsx! { p { class: "error", "Could not load projects: {e}" } },
                    Some(Ok(list)) if list.is_empty() => rsx! { p { "No projects yet." } },
                    Some(Ok(list)) => rsx! {
                        ul { class: "project-list",
                            for p in list.iter() {
                                li { key: "{p.id}",
                                    Link {
                                        to: Route::ProjectView { id: p.route_key.clone() },
                                        "{p.name}"
                                    }
                                    span { class: "task-count", " {p.task_count} tasks" }
                                    if let Some(org) = &p.organisation {
                                        span { class: "organisation", title: "{org.description}", " {org.name}" }
                                    }
                                }
                            }
                        }
                    },
                }
            }
        }
    }
}
