//! Public marketing pages.

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::handler::template::{layout, simple_page};
use crate::service::ServiceState;

async fn home() -> Html<String> {
    layout(
        "Welcome",
        "<h1>Sleep under the stars</h1>\
         <p>Safari tents, domes and cabins on the edge of the forest.</p>\
         <p><a href=\"/glamps\">Browse glamps</a> or <a href=\"/booking\">book a stay</a>.</p>",
    )
}

async fn glamps() -> Html<String> {
    simple_page(
        "Our glamps",
        "Every glamp has a real bed, a wood burner and a private deck.",
    )
}

async fn about() -> Html<String> {
    simple_page(
        "About us",
        "A family-run site welcoming guests since the first tent went up in the meadow.",
    )
}

async fn contact() -> Html<String> {
    simple_page("Contact", "Reach the front desk by phone or email, every day from 8 to 20.")
}

async fn facilities() -> Html<String> {
    simple_page(
        "Facilities",
        "Heated shower blocks, a communal kitchen, fire pits and a small shop.",
    )
}

async fn gallery() -> Html<String> {
    simple_page("Gallery", "Photos of the site through the seasons.")
}

async fn policies() -> Html<String> {
    simple_page(
        "Policies",
        "Check-in from 15:00, check-out by 11:00. Quiet hours start at 22:00.",
    )
}

async fn packages() -> Html<String> {
    simple_page(
        "Packages",
        "Weekend escapes, midweek breaks and group bookings.",
    )
}

async fn booking() -> Html<String> {
    simple_page("Book a stay", "Pick your dates and glamp to check availability.")
}

async fn unauthorized() -> Html<String> {
    layout(
        "Access denied",
        "<h1>Access denied</h1>\
         <p>Your account cannot open this console.</p>\
         <p><a href=\"/logout\">Sign in with a different account</a></p>",
    )
}

/// Returns a [`Router`] with the public pages and the unauthorized page.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/", get(home))
        .route("/glamps", get(glamps))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/facilities", get(facilities))
        .route("/gallery", get(gallery))
        .route("/policies", get(policies))
        .route("/packages", get(packages))
        .route("/booking", get(booking))
        .route("/unauthorized", get(unauthorized))
}
