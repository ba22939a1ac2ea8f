//! HTML alert fragments swapped into the page by HTMX.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert shown to the user in the fixed alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An error alert with a short message and a longer description.
    Error {
        /// A short summary of what went wrong.
        message: String,
        /// What the user can do about it.
        details: String,
    },
    /// A success alert with a single message.
    Success {
        /// What succeeded.
        message: String,
    },
}

impl Alert {
    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a success alert.
    pub fn success(message: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
        }
    }

    /// Render the alert as an HTML fragment targeting the alert container.
    pub fn into_html(self) -> Markup {
        let body = match self {
            Alert::Error { message, details } => html!(
                div
                    role="alert"
                    class="rounded border border-red-300 bg-red-50 px-4 py-3 shadow-lg
                        text-red-800 dark:border-red-800 dark:bg-gray-800 dark:text-red-400"
                {
                    p class="font-semibold" { (message) }
                    p class="text-sm" { (details) }
                }
            ),
            Alert::Success { message } => html!(
                div
                    role="alert"
                    class="rounded border border-green-300 bg-green-50 px-4 py-3 shadow-lg
                        text-green-800 dark:border-green-800 dark:bg-gray-800 dark:text-green-400"
                {
                    p class="font-semibold" { (message) }
                }
            ),
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                (body)
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
