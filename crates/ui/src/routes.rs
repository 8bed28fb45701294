use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{AttemptView, DashboardView, ExamView, SubjectView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", DashboardView)] Dashboard {},
        #[route("/subject/:slug", SubjectView)] Subject { slug: String },
        #[route("/exam/:slug/:number", ExamView)] Exam { slug: String, number: u32 },
        #[route("/attempt/:id", AttemptView)] Attempt { id: i64 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let who = if ctx.namespace().is_guest() {
        "Guest".to_string()
    } else {
        ctx.namespace().storage_key()
    };

    rsx! {
        nav { class: "sidebar",
            h1 { "Practice Exams" }
            p { class: "sidebar-user", "{who}" }
            ul {
                li { Link { to: Route::Dashboard {}, "Dashboard" } }
                for subject in prep_core::model::Subject::ALL {
                    li {
                        Link {
                            to: Route::Subject { slug: subject.slug().to_string() },
                            "{subject.display_name()}"
                        }
                    }
                }
            }
        }
    }
}
