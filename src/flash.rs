//! One-shot status notices carried across a redirect in a signed cookie.
//!
//! The contract is write notice, redirect, read-and-clear on the next render:
//! `set` stores the notice for the next page view, `take` hands it back and
//! expires the cookie so a reload shows nothing stale.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE_NAME: &str = "postbox_notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Store a notice for the next page render.
///
/// The payload is percent-encoded so the cookie value stays within the
/// characters RFC 6265 allows.
pub fn set(jar: SignedCookieJar, notice: &Notice) -> SignedCookieJar {
    let value = match serde_json::to_string(notice) {
        Ok(value) => urlencoding::encode(&value).into_owned(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode flash notice");
            return jar;
        }
    };

    let cookie = Cookie::build((FLASH_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();

    jar.add(cookie)
}

/// Read and clear the pending notice, if any.
///
/// A cookie that fails signature verification or decoding is treated as
/// absent; it is still removed.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Notice>) {
    let Some(cookie) = jar.get(FLASH_COOKIE_NAME) else {
        return (jar, None);
    };

    let notice = urlencoding::decode(cookie.value())
        .ok()
        .and_then(|value| serde_json::from_str(&value).ok());
    let removal = Cookie::build((FLASH_COOKIE_NAME, "")).path("/").build();

    (jar.remove(removal), notice)
}
