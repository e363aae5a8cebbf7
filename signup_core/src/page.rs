//! The "functional core" of a registration page. Shells (the browser, the TUI)
//! feed it `Action`s as things happen, perform the `Effect`s it hands back,
//! and re-render from its state afterwards.

use crate::api::{error, register};
use crate::timer::{TimerId, Timings};
use crate::{InputType, Submission};
use std::collections::BTreeMap;
use std::mem;
use std::time::Duration;

/// Everything about the registration page that changes over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// How long messages stick around
    timings: Timings,

    /// Whether both password fields are masked or shown
    passwords: InputType,

    /// Inline validation messages, keyed by form field name
    field_errors: BTreeMap<String, Message>,

    /// How many sets of validation messages the server has sent
    field_error_batch: u64,

    /// The general message area
    alert: Option<Alert>,

    /// Where we are with the server
    request: RequestState,

    /// The ID the next scheduled clear will get
    next_timer: TimerId,
}

impl Page {
    /// Create a page with the given message timings
    pub fn new(timings: Timings) -> Self {
        Self {
            timings,
            passwords: InputType::Password,
            field_errors: BTreeMap::new(),
            field_error_batch: 0,
            alert: None,
            request: RequestState::Idle,
            next_timer: TimerId(0),
        }
    }

    /// The `type` both password inputs should have.
    pub fn password_input_type(&self) -> InputType {
        self.passwords
    }

    /// The validation message currently shown for a field, if any.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(|message| message.text.as_str())
    }

    /// All validation messages currently shown, by field name.
    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.text.as_str()))
    }

    /// Changes every time the server sends a new set of validation messages,
    /// even an empty one. Each new set replaces everything shown before it.
    pub fn field_error_batch(&self) -> u64 {
        self.field_error_batch
    }

    /// The general message currently shown, if any.
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Are we waiting on the server?
    pub fn is_submitting(&self) -> bool {
        self.request == RequestState::InFlight
    }

    /// Has the server accepted a registration?
    pub fn is_registered(&self) -> bool {
        self.request == RequestState::Registered
    }

    /// Handle an `Action`, updating the page's state and producing any side
    /// effects the shell needs to perform.
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::PasswordsToggled(checked) => {
                self.passwords = InputType::for_checked(checked);

                vec![]
            }

            Action::Submitted(submission) => match self.request {
                RequestState::Idle => {
                    self.request = RequestState::InFlight;

                    vec![Effect::Register(submission)]
                }
                RequestState::InFlight => {
                    tracing::warn!("ignoring submit while a registration is in flight");

                    vec![]
                }
                RequestState::Registered => {
                    tracing::warn!("ignoring submit after a successful registration");

                    vec![]
                }
            },

            Action::Responded(Ok(resp)) => self.handle_response(resp),

            Action::Responded(Err(err)) => {
                self.request = RequestState::Idle;

                tracing::error!(%err, "registration request failed");

                vec![]
            }

            Action::TimerFired(id) => self.handle_timer(id),
        }
    }

    /// Show whatever the server told us.
    fn handle_response(&mut self, resp: register::Resp) -> Vec<Effect> {
        match resp {
            register::Resp::FieldErrors(errors) => {
                self.request = RequestState::Idle;
                self.field_error_batch = self.field_error_batch.wrapping_add(1);

                // New validation results replace all the old ones.
                let mut effects: Vec<Effect> = mem::take(&mut self.field_errors)
                    .into_values()
                    .map(|message| Effect::CancelTimer(message.timer))
                    .collect();

                for (field, messages) in errors {
                    let timer = self.allocate_timer();

                    self.field_errors.insert(
                        field,
                        Message {
                            text: messages.join(", "),
                            timer,
                        },
                    );

                    effects.push(Effect::StartTimer(timer, self.timings.field_error));
                }

                effects
            }

            register::Resp::Error(text) => {
                self.request = RequestState::Idle;

                self.show_alert(AlertKind::Danger, text, self.timings.alert_error)
            }

            register::Resp::Success(text) => {
                self.request = RequestState::Registered;

                self.show_alert(AlertKind::Success, text, self.timings.success_redirect)
            }
        }
    }

    /// Replace the alert, cancelling the clear scheduled for the old one.
    fn show_alert(&mut self, kind: AlertKind, text: String, ttl: Duration) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);

        if let Some(old) = self.alert.take() {
            effects.push(Effect::CancelTimer(old.timer));
        }

        let timer = self.allocate_timer();
        self.alert = Some(Alert { kind, text, timer });
        effects.push(Effect::StartTimer(timer, ttl));

        effects
    }

    /// Clear whichever message this timer belongs to. Timers for messages that
    /// have since been replaced don't touch anything.
    fn handle_timer(&mut self, id: TimerId) -> Vec<Effect> {
        let field = self
            .field_errors
            .iter()
            .find(|(_, message)| message.timer == id)
            .map(|(field, _)| field.clone());

        if let Some(field) = field {
            self.field_errors.remove(&field);

            return vec![];
        }

        match self.alert.take() {
            Some(alert) if alert.timer == id => match alert.kind {
                AlertKind::Danger => vec![],
                AlertKind::Success => vec![Effect::RedirectToLogin],
            },
            other => {
                self.alert = other;

                tracing::debug!(%id, "ignoring timer for a message that's no longer shown");

                vec![]
            }
        }
    }

    /// Get a fresh timer ID
    fn allocate_timer(&mut self) -> TimerId {
        let id = self.next_timer;
        self.next_timer = id.next();
        id
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Timings::default())
    }
}

/// Where the page is with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    /// Nothing in flight; the form can be submitted
    Idle,

    /// We've sent the form and are waiting for an answer
    InFlight,

    /// The server accepted the registration; we're about to go log in
    Registered,
}

/// An inline message and the timer that will clear it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    /// What to show
    text: String,

    /// The scheduled clear for this message
    timer: TimerId,
}

/// A message in the general alert area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// How to style the alert
    kind: AlertKind,

    /// What to show
    text: String,

    /// The scheduled clear for this message
    timer: TimerId,
}

impl Alert {
    /// How to style the alert
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    /// What to show
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Something went wrong
    Danger,

    /// Registration worked
    Success,
}

impl AlertKind {
    /// Every alert style, for shells that need to clear them all.
    pub const ALL: [AlertKind; 2] = [AlertKind::Danger, AlertKind::Success];

    /// The CSS class the alert container gets for this style
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Danger => "alert-danger",
            Self::Success => "alert-success",
        }
    }
}

/// Things that can happen to the page
#[derive(Debug)]
pub enum Action {
    /// The "show passwords" checkbox changed to this state
    PasswordsToggled(bool),

    /// The user submitted the form
    Submitted(Submission),

    /// The server answered (or we couldn't reach it)
    Responded(error::Result<register::Resp>),

    /// A scheduled clear is due
    TimerFired(TimerId),
}

/// Things the shell should do on the page's behalf. Side effects!
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Send the registration to the server, then report back with
    /// `Action::Responded`
    Register(Submission),

    /// Report back with `Action::TimerFired` after this long
    StartTimer(TimerId, Duration),

    /// Don't bother reporting this timer after all
    CancelTimer(TimerId),

    /// Send the user to the login page
    RedirectToLogin,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::Error;
    use reqwest::StatusCode;

    fn submission() -> Submission {
        Submission::new()
            .with("username", "brian")
            .with("password", "hunter2")
            .with("confirm_password", "hunter2")
            .with("csrf_token", "abc")
    }

    /// Submit the form and answer with the given response, returning the
    /// effects from the response.
    fn respond(page: &mut Page, resp: register::Resp) -> Vec<Effect> {
        page.handle(Action::Submitted(submission()));
        page.handle(Action::Responded(Ok(resp)))
    }

    fn field_errors(errors: &[(&str, &[&str])]) -> register::Resp {
        register::Resp::FieldErrors(
            errors
                .iter()
                .map(|(field, messages)| {
                    (
                        (*field).to_string(),
                        messages.iter().map(|m| (*m).to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    fn started_timers(effects: &[Effect]) -> Vec<(TimerId, Duration)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::StartTimer(id, after) => Some((*id, *after)),
                _ => None,
            })
            .collect()
    }

    mod passwords {
        use super::*;

        #[test]
        fn start_masked() {
            assert_eq!(Page::default().password_input_type(), InputType::Password);
        }

        #[test]
        fn checked_shows_both() {
            let mut page = Page::default();

            let effects = page.handle(Action::PasswordsToggled(true));

            assert!(effects.is_empty());
            assert_eq!(page.password_input_type().as_str(), "text");
        }

        #[test]
        fn unchecked_masks_both_again() {
            let mut page = Page::default();

            page.handle(Action::PasswordsToggled(true));
            page.handle(Action::PasswordsToggled(false));

            assert_eq!(page.password_input_type().as_str(), "password");
        }
    }

    mod submit {
        use super::*;

        #[test]
        fn sends_the_submission() {
            let mut page = Page::default();

            let effects = page.handle(Action::Submitted(submission()));

            assert_eq!(effects, vec![Effect::Register(submission())]);
            assert!(page.is_submitting());
        }

        #[test]
        fn ignores_a_second_submit_while_in_flight() {
            let mut page = Page::default();

            page.handle(Action::Submitted(submission()));
            let effects = page.handle(Action::Submitted(submission()));

            assert!(effects.is_empty());
        }

        #[test]
        fn allows_resubmitting_after_a_response() {
            let mut page = Page::default();

            respond(&mut page, register::Resp::Error("Email taken".to_string()));
            let effects = page.handle(Action::Submitted(submission()));

            assert_eq!(effects, vec![Effect::Register(submission())]);
        }

        #[test]
        fn allows_resubmitting_after_a_transport_failure() {
            let mut page = Page::default();

            page.handle(Action::Submitted(submission()));
            page.handle(Action::Responded(Err(Error::Status(
                StatusCode::INTERNAL_SERVER_ERROR,
            ))));
            let effects = page.handle(Action::Submitted(submission()));

            assert_eq!(effects, vec![Effect::Register(submission())]);
        }

        #[test]
        fn ignores_submits_after_registering() {
            let mut page = Page::default();

            respond(&mut page, register::Resp::Success("Registered!".to_string()));
            let effects = page.handle(Action::Submitted(submission()));

            assert!(effects.is_empty());
            assert!(page.is_registered());
        }
    }

    mod field_errors {
        use super::*;

        #[test]
        fn shows_the_message_under_the_field() {
            let mut page = Page::default();

            let effects = respond(&mut page, field_errors(&[("password", &["too short"])]));

            assert_eq!(page.field_error("password"), Some("too short"));
            assert_eq!(
                started_timers(&effects),
                vec![(TimerId(0), Duration::from_millis(3000))]
            );
        }

        #[test]
        fn joins_multiple_messages() {
            let mut page = Page::default();

            respond(
                &mut page,
                field_errors(&[("password", &["too short", "needs a number"])]),
            );

            assert_eq!(page.field_error("password"), Some("too short, needs a number"));
        }

        #[test]
        fn clears_after_the_timer_fires() {
            let mut page = Page::default();

            let effects = respond(&mut page, field_errors(&[("password", &["too short"])]));
            let (timer, _) = started_timers(&effects)[0];

            page.handle(Action::TimerFired(timer));

            assert_eq!(page.field_error("password"), None);
        }

        #[test]
        fn replaces_all_previous_errors() {
            let mut page = Page::default();

            let first = respond(
                &mut page,
                field_errors(&[("username", &["taken"]), ("password", &["too short"])]),
            );
            let second = respond(&mut page, field_errors(&[("email", &["invalid"])]));

            assert_eq!(page.field_errors().collect::<Vec<_>>(), vec![("email", "invalid")]);

            for (timer, _) in started_timers(&first) {
                assert!(second.contains(&Effect::CancelTimer(timer)));
            }
        }

        #[test]
        fn an_old_timer_does_not_clear_a_newer_message() {
            let mut page = Page::default();

            let first = respond(&mut page, field_errors(&[("password", &["too short"])]));
            respond(&mut page, field_errors(&[("password", &["too common"])]));

            let (old_timer, _) = started_timers(&first)[0];
            page.handle(Action::TimerFired(old_timer));

            assert_eq!(page.field_error("password"), Some("too common"));
        }

        #[test]
        fn empty_errors_clear_everything() {
            let mut page = Page::default();

            respond(&mut page, field_errors(&[("password", &["too short"])]));
            respond(&mut page, field_errors(&[]));

            assert_eq!(page.field_errors().count(), 0);
        }

        #[test]
        fn each_response_starts_a_new_batch() {
            let mut page = Page::default();
            assert_eq!(page.field_error_batch(), 0);

            respond(&mut page, field_errors(&[("password", &["too short"])]));
            respond(&mut page, field_errors(&[]));

            assert_eq!(page.field_error_batch(), 2);
        }

        #[test]
        fn other_responses_keep_the_batch() {
            let mut page = Page::default();

            respond(&mut page, field_errors(&[("password", &["too short"])]));
            respond(&mut page, register::Resp::Error("Email taken".to_string()));

            assert_eq!(page.field_error_batch(), 1);
        }

        #[test]
        fn leave_the_alert_alone() {
            let mut page = Page::default();

            respond(&mut page, register::Resp::Error("Email taken".to_string()));
            respond(&mut page, field_errors(&[("password", &["too short"])]));

            assert_eq!(page.alert().map(Alert::text), Some("Email taken"));
        }
    }

    mod alert {
        use super::*;

        #[test]
        fn error_shows_danger() {
            let mut page = Page::default();

            let effects = respond(&mut page, register::Resp::Error("Email taken".to_string()));

            let alert = page.alert().unwrap();
            assert_eq!(alert.text(), "Email taken");
            assert_eq!(alert.kind().css_class(), "alert-danger");
            assert_eq!(
                started_timers(&effects),
                vec![(TimerId(0), Duration::from_millis(5000))]
            );
        }

        #[test]
        fn error_clears_after_the_timer_fires() {
            let mut page = Page::default();

            let effects = respond(&mut page, register::Resp::Error("Email taken".to_string()));
            let (timer, _) = started_timers(&effects)[0];

            let effects = page.handle(Action::TimerFired(timer));

            assert!(effects.is_empty());
            assert!(page.alert().is_none());
        }

        #[test]
        fn success_shows_success() {
            let mut page = Page::default();

            let effects = respond(&mut page, register::Resp::Success("Registered!".to_string()));

            let alert = page.alert().unwrap();
            assert_eq!(alert.text(), "Registered!");
            assert_eq!(alert.kind().css_class(), "alert-success");
            assert_eq!(
                started_timers(&effects),
                vec![(TimerId(0), Duration::from_millis(2000))]
            );
        }

        #[test]
        fn success_redirects_after_the_timer_fires() {
            let mut page = Page::default();

            let effects = respond(&mut page, register::Resp::Success("Registered!".to_string()));
            let (timer, _) = started_timers(&effects)[0];

            let effects = page.handle(Action::TimerFired(timer));

            assert_eq!(effects, vec![Effect::RedirectToLogin]);
            assert!(page.alert().is_none());
        }

        #[test]
        fn a_new_error_cancels_the_old_clear() {
            let mut page = Page::default();

            let first = respond(&mut page, register::Resp::Error("Email taken".to_string()));
            let second = respond(&mut page, register::Resp::Error("Try later".to_string()));

            let (old_timer, _) = started_timers(&first)[0];
            assert!(second.contains(&Effect::CancelTimer(old_timer)));

            page.handle(Action::TimerFired(old_timer));
            assert_eq!(page.alert().map(Alert::text), Some("Try later"));
        }

        #[test]
        fn custom_timings_are_used() {
            let mut page = Page::new(Timings {
                field_error: Duration::from_millis(1),
                alert_error: Duration::from_millis(2),
                success_redirect: Duration::from_millis(3),
            });

            let effects = respond(&mut page, register::Resp::Success("ok".to_string()));

            assert_eq!(
                started_timers(&effects),
                vec![(TimerId(0), Duration::from_millis(3))]
            );
        }
    }

    mod transport_errors {
        use super::*;

        #[test]
        fn http_error_status_changes_nothing_visible() {
            let mut page = Page::default();
            respond(&mut page, field_errors(&[("password", &["too short"])]));
            page.handle(Action::Submitted(submission()));
            let before = page.clone();

            let effects = page.handle(Action::Responded(Err(Error::Status(
                StatusCode::INTERNAL_SERVER_ERROR,
            ))));

            assert!(effects.is_empty());
            assert_eq!(page.field_errors, before.field_errors);
            assert_eq!(page.alert, before.alert);
            assert_eq!(page.passwords, before.passwords);
        }

        #[test]
        fn url_errors_change_nothing_visible() {
            let mut page = Page::default();
            page.handle(Action::Submitted(submission()));

            let effects = page.handle(Action::Responded(Err(Error::UrlParse(
                url::ParseError::RelativeUrlWithoutBase,
            ))));

            assert!(effects.is_empty());
            assert!(page.alert().is_none());
            assert_eq!(page.field_errors().count(), 0);
        }
    }

    mod timers {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn unknown_timers_are_ignored() {
            let mut page = Page::default();
            respond(&mut page, register::Resp::Error("Email taken".to_string()));
            let before = page.clone();

            let effects = page.handle(Action::TimerFired(TimerId(99)));

            assert!(effects.is_empty());
            assert_eq!(page, before);
        }

        /// Things that can happen to the alert area
        #[derive(Debug, Clone, proptest_derive::Arbitrary)]
        enum Op {
            /// The server sends a general error
            Error(#[proptest(strategy = "\"[a-z]{1,8}\"")] String),

            /// The longest-pending timer fires
            FireOldest,

            /// The most recently started timer fires
            FireNewest,
        }

        proptest! {
            #[test]
            fn joined_text_matches_messages(messages in proptest::collection::vec("[a-z ]{1,10}", 1..5)) {
                let mut page = Page::default();
                let refs: Vec<&str> = messages.iter().map(String::as_str).collect();

                respond(&mut page, field_errors(&[("email", refs.as_slice())]));

                let joined = messages.join(", ");
                prop_assert_eq!(page.field_error("email"), Some(joined.as_str()));
            }

            #[test]
            fn alert_shows_latest_message_until_its_own_timer_fires(ops: Vec<Op>) {
                let mut page = Page::default();
                let mut pending: Vec<TimerId> = Vec::new();
                let mut expected: Option<(String, TimerId)> = None;

                for op in ops {
                    let fired = match op {
                        Op::Error(text) => {
                            let effects = respond(&mut page, register::Resp::Error(text.clone()));
                            for effect in effects {
                                match effect {
                                    Effect::StartTimer(id, _) => {
                                        pending.push(id);
                                        expected = Some((text.clone(), id));
                                    }
                                    Effect::CancelTimer(id) => pending.retain(|p| *p != id),
                                    _ => {}
                                }
                            }
                            None
                        }
                        Op::FireOldest if !pending.is_empty() => Some(pending.remove(0)),
                        Op::FireNewest => pending.pop(),
                        Op::FireOldest => None,
                    };

                    if let Some(id) = fired {
                        page.handle(Action::TimerFired(id));
                        if expected.as_ref().is_some_and(|(_, current)| *current == id) {
                            expected = None;
                        }
                    }

                    prop_assert_eq!(
                        page.alert().map(Alert::text),
                        expected.as_ref().map(|(text, _)| text.as_str())
                    );
                }
            }
        }
    }
}
