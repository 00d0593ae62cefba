//! User-facing wording for client errors.
//!
//! Each error kind maps to a message that points at the next action: add a
//! key, replace a rejected key, pick another format, or just report the
//! failure.

use crate::selection::SelectionError;
use alkaline_cloudconvert::{Error, ErrorKind};

pub fn user_message(err: &Error) -> String {
    match err.kind() {
        ErrorKind::MissingCredential => {
            "No CloudConvert API key is configured. Run `alkaline set-key <KEY>` or set CLOUDCONVERT_API_TOKEN."
                .to_string()
        }
        ErrorKind::Authentication => format!(
            "CloudConvert rejected the API key. Run `alkaline set-key <KEY>` to replace it. ({err})"
        ),
        ErrorKind::NoFormatsAvailable => format!("Nothing to convert to: {err}."),
        ErrorKind::OutputExists => format!("{err}. Use --overwrite to replace it."),
        ErrorKind::Cancelled => "Cancelled.".to_string(),
        _ => err.to_string(),
    }
}

/// Selection problems read like the client errors they may wrap.
pub fn selection_message(err: &SelectionError) -> String {
    match err {
        SelectionError::Client(inner) => user_message(inner),
        other => other.to_string(),
    }
}
