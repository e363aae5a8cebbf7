use crossterm::event::KeyEvent;
use signup_core::page;

/// Things that can happen to this app
#[derive(Debug)]
pub enum Action {
    /// The user did something on the keyboard
    Key(KeyEvent),

    /// Something the registration page needs to react to (a server response
    /// or a message timer)
    Page(page::Action),

    /// We looked for a CSRF token on the registration page
    GotCsrfToken(Option<String>),

    /// Something bad happened; display it to the user
    Problem(String),
}
