pub mod billing;
pub mod health;
pub mod reports;
pub mod students;

use axum::Router;
use chrono::NaiveDate;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(billing::router())
        .nest("/students", students::router())
        .nest("/reports", reports::router())
}

/// Calendar date on the server's clock.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
