use dioxus::logger::tracing;
use dioxus::prelude::*;
use fieldmap_shared::features::TaskKey;
use fieldmap_shared::models::TaskStatus;

use crate::api;

/// Statuses a mapper can move a task into by hand.
const SETTABLE: [TaskStatus; 6] = [
    TaskStatus::Ready,
    TaskStatus::LockedForMapping,
    TaskStatus::Mapped,
    TaskStatus::LockedForValidation,
    TaskStatus::Validated,
    TaskStatus::Invalidated,
];

#[component]
pub fn TaskPanel(
    project_id: u64,
    route_key: String,
    selected: Signal<Option<TaskKey>>,
    on_updated: EventHandler<()>,
) -> Element {
    let mut selected = selected;
    let mut error = use_signal(|| None::<String>);
    let share_url = api::origin()
        .map(|origin| api::build_project_url(&origin, &route_key))
        .unwrap_or_default();

    rsx! {
        div { class: "panel",
            h3 { "Task" }
            match &*selected.read() {
                Some(key) => rsx! {
                    div { class: "task-info",
                        strong { "#{key.id}" }
                        span { class: "status-label", {key.status.display_name()} }
                    }
                    div { class: "status-buttons",
                        for status in SETTABLE {
                            button {
                                key: "{status}",
                                class: if status == key.status { "active" } else { "secondary" },
                                disabled: status == key.status,
                                onclick: {
                                    let task_id = key.id;
                                    let status = status.clone();
                                    move |_| {
                                        let status = status.clone();
                                        spawn(async move {
                                            match api::update_task_status(project_id, task_id, &status).await {
                                                Ok(task) => {
                                                    error.set(None);
                                                    selected.set(Some(TaskKey::new(task.id, task.status)));
                                                    on_updated.call(());
                                                }
                                                Err(e) => {
                                                    tracing::warn!(task_id, error = %e, "Status update failed");
                                                    error.set(Some(e));
                                                }
                                            }
                                        });
                                    }
                                },
                                {status.display_name()}
                            }
                        }
                    }
                },
                None => rsx! {
                    p { class: "hint", "Click a task on the map to select it." }
                },
            }
            if let Some(e) = &*error.read() {
                p { class: "error", "{e}" }
            }
            if !share_url.is_empty() {
                div { class: "share-link",
                    input {
                        r#type: "text",
                        readonly: true,
                        value: "{share_url}",
                    }
                    button {
                        class: "secondary",
                        onclick: {
                            let url = share_url.clone();
                            move |_| {
                                let url = url.clone();
                                wasm_bindgen_futures::spawn_local(async move {
                                    if let Some(window) = web_sys::window() {
                                        let clipboard = window.navigator().clipboard();
                                        let _ = wasm_bindgen_futures::JsFuture::from(
                                            clipboard.write_text(&url)
                                        ).await;
                                    }
                                });
                            }
                        },
                        "Copy link"
                    }
                }
            }
        }
    }
}
