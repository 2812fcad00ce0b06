use axum::response::IntoResponse;
use axum_extra::extract::SignedCookieJar;

use crate::flash::{self, Notice};
use crate::template;

#[derive(askama::Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub notice: Option<Notice>,
}

/// GET / - Contact form page, showing any notice left by the last submission.
pub async fn page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, notice) = flash::take(jar);

    (jar, template::render(IndexTemplate { notice }))
}
