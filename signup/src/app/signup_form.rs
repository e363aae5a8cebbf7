use crate::form_fields;
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use signup_core::{form::CSRF_FIELD, page::AlertKind, InputType, Page, Submission};
use tui_input::{backend::crossterm::EventHandler, Input};

form_fields!(
    Field,
    Email => ("Email", "email"),
    Username => ("Username", "username"),
    Password => ("Password", "password"),
    ConfirmPassword => ("Confirm password", "confirm_password"),
    ShowPasswords => ("Show passwords", "show"),
);

/// A form for entering registration information
#[derive(Debug)]
pub struct SignupForm {
    /// Which field we're editing
    active: Field,

    /// Where should we send account emails?
    email: Input,

    /// Who are you?
    username: Input,

    /// What's your password? (Masked unless shown)
    password: Input,

    /// Same again, to catch typos
    confirm_password: Input,

    /// Whether the "show passwords" box is ticked
    show_passwords: bool,
}

/// What a keypress meant for the form as a whole.
#[derive(Debug, PartialEq, Eq)]
pub enum FormEvent {
    /// Nothing the app needs to know about
    None,

    /// The "show passwords" box changed
    ShowPasswords(bool),

    /// The user wants to send the form
    Submit,
}

impl SignupForm {
    /// Render the form, with validation messages and the alert area from `page`.
    #[expect(clippy::cast_possible_truncation)]
    pub fn render(&self, body_area: Rect, frame: &mut Frame<'_>, page: &Page) {
        let popup_vert = Layout::vertical([Constraint::Length(18)]).flex(Flex::Center);
        let popup_horiz = Layout::horizontal([Constraint::Percentage(50)]).flex(Flex::Center);

        let [popup_area] = popup_vert.areas(body_area);
        let [popup_area] = popup_horiz.areas(popup_area);
        frame.render_widget(Clear, popup_area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .title("Create account")
            .border_style(Style::default().fg(Color::Blue));
        let inner = outer.inner(popup_area);
        frame.render_widget(outer, popup_area);

        let [email_area, username_area, password_area, confirm_area, show_area, alert_area] =
            Layout::vertical(Constraint::from_lengths([3, 3, 3, 3, 1, 3])).areas(inner);

        let width = inner.width.saturating_sub(2 + 1) as usize; // -2 for the border, -1 for the cursor
        let masking = page.password_input_type();

        for (field, area) in [
            (Field::Email, email_area),
            (Field::Username, username_area),
            (Field::Password, password_area),
            (Field::ConfirmPassword, confirm_area),
        ] {
            let Some(input) = self.input(field) else {
                continue;
            };

            let scroll = input.visual_scroll(width);
            let shown = match field {
                Field::Password | Field::ConfirmPassword => masking.mask(input.value()),
                _ => input.value().to_string(),
            };

            let border_style = if self.active == field {
                Style::default().fg(Color::Blue)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let mut block = Block::default()
                .borders(Borders::ALL)
                .title(field.label())
                .border_style(border_style);

            if let Some(error) = page.field_error(field.name()) {
                block = block.title_bottom(Line::from(error.to_string()).red());
            }

            frame.render_widget(
                Paragraph::new(shown)
                    .scroll((0, scroll as u16))
                    .block(block),
                area,
            );

            if self.active == field {
                frame.set_cursor_position((
                    area.x
                        + (input.visual_cursor().max(scroll) - scroll) as u16 // current end of text
                        + 1, // just past the end of the text
                    area.y + 1, // +1 row for the border/title
                ));
            }
        }

        // SHOW PASSWORDS
        {
            let mark = if masking == InputType::Text { "x" } else { " " };
            let checkbox = Paragraph::new(format!("[{mark}] {}", Field::ShowPasswords.label()));

            frame.render_widget(
                if self.active == Field::ShowPasswords {
                    checkbox.blue()
                } else {
                    checkbox
                },
                show_area,
            );
        }

        // ALERT
        if let Some(alert) = page.alert() {
            let color = match alert.kind() {
                AlertKind::Danger => Color::Red,
                AlertKind::Success => Color::Green,
            };

            frame.render_widget(
                Paragraph::new(alert.text().to_string())
                    .style(Style::default().fg(color))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(color)),
                    ),
                alert_area,
            );
        } else if page.is_submitting() {
            frame.render_widget(Paragraph::new("Submitting…").dark_gray(), alert_area);
        }
    }

    /// Handle a keypress, telling the app if it needs to do anything about it.
    pub fn handle_event(&mut self, key: KeyEvent) -> FormEvent {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.active = self.active.next();
                FormEvent::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active = self.active.prev();
                FormEvent::None
            }
            KeyCode::Char(' ') | KeyCode::Enter if self.active == Field::ShowPasswords => {
                self.show_passwords = !self.show_passwords;
                FormEvent::ShowPasswords(self.show_passwords)
            }
            KeyCode::Enter => FormEvent::Submit,
            _ => {
                let event = Event::Key(key);

                if let Some(input) = self.input_mut(self.active) {
                    input.handle_event(&event);
                }

                FormEvent::None
            }
        }
    }

    /// Collect what's been entered, in form order, along with the CSRF token.
    pub fn finish(&self, csrf_token: &str) -> Submission {
        Field::FIELDS
            .iter()
            .filter_map(|field| {
                self.input(*field)
                    .map(|input| (field.name(), input.value().to_string()))
            })
            .chain([(CSRF_FIELD, csrf_token.to_string())])
            .collect()
    }

    /// Does the form have an input that shows errors for this server-side
    /// field name?
    pub fn shows_errors_for(name: &str) -> bool {
        Field::FIELDS
            .iter()
            .any(|field| field.name() == name && *field != Field::ShowPasswords)
    }

    /// The text input behind a field, if it has one.
    fn input(&self, field: Field) -> Option<&Input> {
        match field {
            Field::Email => Some(&self.email),
            Field::Username => Some(&self.username),
            Field::Password => Some(&self.password),
            Field::ConfirmPassword => Some(&self.confirm_password),
            Field::ShowPasswords => None,
        }
    }

    /// Mutable version of `input`
    fn input_mut(&mut self, field: Field) -> Option<&mut Input> {
        match field {
            Field::Email => Some(&mut self.email),
            Field::Username => Some(&mut self.username),
            Field::Password => Some(&mut self.password),
            Field::ConfirmPassword => Some(&mut self.confirm_password),
            Field::ShowPasswords => None,
        }
    }
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            active: Field::Email,
            email: Input::default(),
            username: Input::default(),
            password: Input::default(),
            confirm_password: Input::default(),
            show_passwords: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(form: &mut SignupForm, code: KeyCode) -> FormEvent {
        form.handle_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut SignupForm, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    #[test]
    fn tab_cycles_through_fields() {
        let mut form = SignupForm::default();

        for _ in Field::FIELDS {
            press(&mut form, KeyCode::Tab);
        }

        assert_eq!(form.active, Field::Email);
    }

    #[test]
    fn back_tab_wraps_around() {
        let mut form = SignupForm::default();

        press(&mut form, KeyCode::BackTab);

        assert_eq!(form.active, Field::ShowPasswords);
    }

    #[test]
    fn space_toggles_show_passwords() {
        let mut form = SignupForm::default();
        form.active = Field::ShowPasswords;

        assert_eq!(press(&mut form, KeyCode::Char(' ')), FormEvent::ShowPasswords(true));
        assert_eq!(press(&mut form, KeyCode::Char(' ')), FormEvent::ShowPasswords(false));
    }

    #[test]
    fn enter_in_a_text_field_submits() {
        let mut form = SignupForm::default();

        assert_eq!(press(&mut form, KeyCode::Enter), FormEvent::Submit);
    }

    #[test]
    fn only_text_inputs_show_errors() {
        assert!(SignupForm::shows_errors_for("confirm_password"));
        assert!(!SignupForm::shows_errors_for("show"));
        assert!(!SignupForm::shows_errors_for("csrf_token"));
    }

    #[test]
    fn finish_collects_fields_in_order() {
        let mut form = SignupForm::default();
        type_text(&mut form, "me@example.com");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "me");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "hunter2");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "hunter2");

        let submission = form.finish("tok");

        assert_eq!(
            submission.fields().collect::<Vec<_>>(),
            vec![
                ("email", "me@example.com"),
                ("username", "me"),
                ("password", "hunter2"),
                ("confirm_password", "hunter2"),
                ("csrf_token", "tok"),
            ]
        );
        assert_eq!(submission.csrf_token(), "tok");
    }
}
