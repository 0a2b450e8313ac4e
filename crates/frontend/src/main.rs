mod api;
mod components;
mod map_host;
mod pages;
mod viewport;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/project/:id")]
    ProjectView { id: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::home::ProjectList {}
    }
}

#[component]
fn ProjectView(id: String) -> Element {
    rsx! {
        pages::project::ProjectTasks { key: "{id}", route_id: id }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
