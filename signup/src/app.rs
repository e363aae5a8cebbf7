/// Things that can happen to this app
mod action;
pub use action::Action;

/// Side effects the app asks the shell to perform
mod effect;
pub use effect::{Effect, EffectContext};

/// The registration form itself
mod signup_form;

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    widgets::Paragraph,
    Frame,
};
use signup_core::{
    api::{self, login},
    page, Page,
};
use signup_form::{FormEvent, SignupForm};
use std::process::ExitCode;

/// The "functional core" of the app.
pub struct App {
    /// Status to display (visible at the bottom of the screen)
    status_line: Option<String>,

    /// Where the app is in its lifecycle
    state: AppState,

    /// The server we're registering with
    client: api::Client,

    /// The token to send with the form, once we have one
    csrf_token: Option<String>,

    /// Whether we're still reading the token off the registration page
    fetching_token: bool,

    /// What the user has typed so far
    form: SignupForm,

    /// Validation messages, alerts, and where we are with the server
    page: Page,
}

impl App {
    /// Create a new instance of the app
    pub fn new(client: api::Client, csrf_token: Option<String>) -> Self {
        Self {
            status_line: None,
            state: AppState::Running,
            client,
            fetching_token: csrf_token.is_none(),
            csrf_token,
            form: SignupForm::default(),
            page: Page::default(),
        }
    }

    /// Render the app's UI to the screen
    pub fn render(&mut self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]);
        let [body_area, status_area] = vertical.areas(frame.area());

        match &self.state {
            AppState::Running => self.form.render(body_area, frame, &self.page),
            AppState::Exiting(_) => frame.render_widget(Paragraph::new("Exiting…"), body_area),
        }

        let unmatched = self.unmatched_field_errors();
        let status = Paragraph::new(match &self.status_line {
            Some(line) => line.clone(),
            None if !unmatched.is_empty() => unmatched.join(" · "),
            None => "tab: next field · enter: submit · esc: quit".to_owned(),
        });

        frame.render_widget(status, status_area);
    }

    /// Produce any side effects as needed to initialize the app.
    pub fn init(&self) -> Vec<Effect> {
        if self.csrf_token.is_some() {
            vec![]
        } else {
            vec![Effect::FetchCsrfToken(self.client.clone())]
        }
    }

    /// Handle an `Action`, updating the app's state and producing some side effect(s)
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return vec![];
                }

                let quit = key.code == KeyCode::Esc
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL));

                if quit {
                    self.state = AppState::Exiting(ExitCode::FAILURE);
                    return vec![];
                }

                match self.form.handle_event(key) {
                    FormEvent::None => vec![],
                    FormEvent::ShowPasswords(checked) => {
                        self.handle_page(page::Action::PasswordsToggled(checked))
                    }
                    FormEvent::Submit if self.fetching_token => {
                        tracing::debug!("ignoring submit until the CSRF token arrives");
                        self.status_line =
                            Some("Still fetching a CSRF token; try again in a moment".to_owned());

                        vec![]
                    }
                    FormEvent::Submit => {
                        let submission =
                            self.form.finish(self.csrf_token.as_deref().unwrap_or_default());

                        self.handle_page(page::Action::Submitted(submission))
                    }
                }
            }

            Action::Page(action) => self.handle_page(action),

            Action::GotCsrfToken(token) => {
                self.status_line = if token.is_some() {
                    None
                } else {
                    Some("The registration page had no CSRF token; submitting without one".to_owned())
                };
                self.csrf_token = token;
                self.fetching_token = false;

                vec![]
            }

            Action::Problem(problem) => {
                // Fetching the token is the only effect that fails this way.
                // Let the user try without one.
                self.fetching_token = false;
                self.status_line = Some(problem);

                vec![]
            }
        }
    }

    /// Pass an action along to the page and translate what it wants done.
    fn handle_page(&mut self, action: page::Action) -> Vec<Effect> {
        let batch = self.page.field_error_batch();
        let effects = self.page.handle(action);

        if self.page.field_error_batch() != batch {
            for message in self.unmatched_field_errors() {
                tracing::warn!(%message, "validation message for a field the form doesn't have");
            }
        }

        effects
            .into_iter()
            .filter_map(|effect| match effect {
                page::Effect::Register(submission) => {
                    Some(Effect::Register(self.client.clone(), submission))
                }
                page::Effect::StartTimer(id, after) => Some(Effect::StartTimer(id, after)),
                page::Effect::CancelTimer(id) => Some(Effect::CancelTimer(id)),
                page::Effect::RedirectToLogin => {
                    self.state = AppState::Exiting(ExitCode::SUCCESS);
                    None
                }
            })
            .collect()
    }

    /// Validation messages for fields the form has no input for (like the
    /// CSRF token), as `field: message` lines.
    fn unmatched_field_errors(&self) -> Vec<String> {
        self.page
            .field_errors()
            .filter(|(field, _)| !SignupForm::shows_errors_for(field))
            .map(|(field, text)| format!("{field}: {text}"))
            .collect()
    }

    /// Let the TUI manager know whether we're all wrapped up and can exit.
    pub fn should_exit(&self) -> Option<ExitCode> {
        if let AppState::Exiting(code) = &self.state {
            Some(*code)
        } else {
            None
        }
    }

    /// What to tell the user once the terminal is back to normal.
    pub fn farewell(&self) -> Option<String> {
        if self.page.is_registered() {
            Some(match self.client.url(login::PATH) {
                Ok(url) => format!("Registered! Log in at {url}"),
                Err(_) => "Registered!".to_owned(),
            })
        } else {
            None
        }
    }
}

/// App lifecycle
#[derive(Debug)]
enum AppState {
    /// Showing the form
    Running,

    /// We're done and want the following exit code after final effects
    Exiting(ExitCode),
}
