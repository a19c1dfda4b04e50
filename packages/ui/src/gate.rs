//! Navigation gating for routed views.

use api::gate::Decision;
use api::RouteName;
use dioxus::prelude::*;

use crate::app::use_app;

/// Run the session gate for `route`. The resource resolves to the route it was
/// checked for and the decision, and re-runs whenever `route` changes.
pub fn use_gate(route: RouteName) -> Resource<(RouteName, Decision)> {
    let app = use_app();
    use_resource(use_reactive((&route,), move |(route,)| {
        let app = app.clone();
        async move { (route, app.gate.check_route(route).await) }
    }))
}

/// Render `children` only once the gate lets navigation to `route` proceed.
///
/// Nothing is rendered while the check is pending or when the last decision
/// belongs to another route, so protected content never flashes.
#[component]
pub fn GateView(route: RouteName, children: Element) -> Element {
    let gate = use_gate(route);
    let nav = use_navigator();

    let checked = *gate.read();
    match checked {
        Some((checked, Decision::Proceed)) if checked == route => rsx! {
            {children}
        },
        Some((checked, Decision::Redirect(target))) if checked == route => {
            tracing::debug!("Redirecting {route} to {target}");
            nav.replace(target.path());
            rsx! {}
        }
        _ => rsx! {},
    }
}
