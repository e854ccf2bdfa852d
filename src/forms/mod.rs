//! Input validation and payload construction for every console form.
//!
//! Schemas are plain structs borrowing a [`Strings`](crate::i18n::Strings)
//! table: the rules live here, the wording lives in the table.

pub mod access_control;
pub mod auth;
pub mod ip_list;
pub mod oauth2;
pub mod rate_limit;
pub mod token;

/// Upper bound on a description, in UTF-16 code units (the unit the web
/// console's length check counts).
pub const MAX_DESCRIPTION_CHARS: usize = 255;

pub(crate) fn description_too_long(desc: &str) -> bool {
    desc.encode_utf16().count() > MAX_DESCRIPTION_CHARS
}

/// Whether a dialog creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}
