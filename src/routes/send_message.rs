use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum_extra::extract::{Form, SignedCookieJar};
use serde::Deserialize;
use validator::Validate;

use crate::email::Submission;
use crate::flash::{self, Notice};
use crate::routes::AppState;

#[derive(Deserialize, Validate)]
pub struct ActionInput {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub message: String,
}

/// POST /send_message - Relay a submission, then redirect back to the form.
///
/// Every branch leaves a notice and redirects; a failed send is reported to
/// the visitor, never surfaced as an error page.
pub async fn action(
    State(app): State<AppState>,
    jar: SignedCookieJar,
    Form(input): Form<ActionInput>,
) -> impl IntoResponse {
    if input.validate().is_err() {
        let jar = flash::set(jar, &Notice::error("All fields are required!"));
        return (jar, Redirect::to("/"));
    }

    let submission = Submission {
        name: input.name,
        email: input.email,
        message: input.message,
    };

    let notice = match app.mailer.send_contact_notification(&submission) {
        Ok(()) => {
            tracing::info!(name = %submission.name, "contact message relayed");
            Notice::success("Your message has been sent successfully!")
        }
        Err(err) => {
            tracing::error!(error = %err, name = %submission.name, "failed to send contact message");
            Notice::error(format!(
                "Failed to send message. Please try again later. Error: {err}"
            ))
        }
    };

    (flash::set(jar, &notice), Redirect::to("/"))
}
