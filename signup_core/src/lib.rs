//! Common code across all signup clients (TUI, WASM in the browser)

/// Talk to the registration server.
pub mod api;

/// Find the CSRF token in a rendered registration page.
pub mod csrf;

/// The form data we send when registering.
pub mod form;
pub use form::Submission;

/// The state of the registration page, and how it reacts to things happening.
pub mod page;
pub use page::Page;

/// Timers that clear messages after a while.
pub mod timer;
pub use timer::{TimerId, Timings};

/// Showing and hiding passwords.
pub mod visibility;
pub use visibility::InputType;
