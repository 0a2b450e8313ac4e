use dioxus::prelude::*;
use fieldmap_shared::style::StyleTable;

#[derive(Debug, Clone, PartialEq)]
struct LegendEntry {
    label: String,
    fill: String,
    stroke: String,
}

fn legend_entries(table: &StyleTable) -> Vec<LegendEntry> {
    table
        .entries()
        .into_iter()
        .map(|(status, style)| LegendEntry {
            label: status.display_name(),
            fill: style.fill.to_css(),
            stroke: style.stroke.to_css(),
        })
        .collect()
}

#[component]
pub fn StatusLegend() -> Element {
    let entries = use_hook(|| legend_entries(&StyleTable::task_defaults()));

    rsx! {
        div { class: "panel legend",
            h3 { "Task status" }
            ul {
                for entry in entries {
                    li { key: "{entry.label}",
                        span {
                            class: "swatch",
                            style: "background:{entry.fill};border-color:{entry.stroke};",
                        }
                        "{entry.label}"
                    }
                }
            }
        }
    }
}
