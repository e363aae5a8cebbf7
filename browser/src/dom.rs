//! The markup the registration page relies on. The template owns these
//! elements; we look them up once and then only change text, classes, and
//! input types. Messages the template rendered itself (flashed alerts,
//! server-side validation) stay put until a response replaces them.

use signup_core::{page::AlertKind, Page, Submission};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, FormData, HtmlFormElement, HtmlInputElement};

/// The "show passwords" checkbox
pub const SHOW: &str = "#show";

/// The password input
pub const PASSWORD: &str = "#password";

/// The confirm-password input
pub const CONFIRM_PASSWORD: &str = "#confirmpassword";

/// The registration form
pub const FORM: &str = "#register";

/// Every inline validation message node
pub const FIELD_ERRORS: &str = ".error";

/// The general message container, which gets the alert style classes
pub const ALERT: &str = ".alert";

/// Where the general message text goes
pub const ALERT_MESSAGE: &str = ".alert p";

/// The ID of the node holding validation messages for a form field.
pub fn field_error_id(field: &str) -> String {
    format!("{field}-error")
}

/// The elements the page needs, looked up once when the page loads.
pub struct Dom {
    /// For looking up per-field error nodes by ID
    document: Document,

    /// The "show passwords" checkbox
    pub show: HtmlInputElement,

    /// The password input
    password: HtmlInputElement,

    /// The confirm-password input
    confirm_password: HtmlInputElement,

    /// The registration form
    pub form: HtmlFormElement,

    /// The alert container
    alert: Element,

    /// The alert text
    alert_message: Element,

    /// Which message nodes we've written to
    written: RefCell<Written>,
}

impl Dom {
    /// Find everything we need in the document.
    ///
    /// ## Errors
    ///
    /// Fails if any of the elements are missing or aren't what we expect
    /// (e.g. `#register` isn't a form.)
    pub fn query(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            show: query(document, SHOW)?,
            password: query(document, PASSWORD)?,
            confirm_password: query(document, CONFIRM_PASSWORD)?,
            form: query(document, FORM)?,
            alert: query(document, ALERT)?,
            alert_message: query(document, ALERT_MESSAGE)?,
            written: RefCell::new(Written::default()),
        })
    }

    /// Make the document match the page.
    pub fn render(&self, page: &Page) {
        let input_type = page.password_input_type().as_str();
        for input in [&self.password, &self.confirm_password] {
            if let Err(err) = input.set_attribute("type", input_type) {
                tracing::error!(?err, "could not set password input type");
            }
        }

        let changes = self.written.borrow_mut().update(page);

        self.apply_field_errors(&changes);
        self.apply_alert(&changes.alert);
    }

    /// Clear and write inline messages.
    fn apply_field_errors(&self, changes: &Changes) {
        if changes.clear_all_fields {
            match self.document.query_selector_all(FIELD_ERRORS) {
                Ok(nodes) => {
                    for i in 0..nodes.length() {
                        if let Some(node) = nodes.item(i) {
                            node.set_text_content(Some(""));
                        }
                    }
                }
                Err(err) => tracing::error!(?err, "could not find field error nodes"),
            }
        }

        for field in &changes.clear_fields {
            if let Some(node) = self.document.get_element_by_id(&field_error_id(field)) {
                node.set_text_content(Some(""));
            }
        }

        for (field, text) in &changes.write_fields {
            match self.document.get_element_by_id(&field_error_id(field)) {
                Some(node) => node.set_text_content(Some(text)),
                None => tracing::warn!(%field, "no error node for field"),
            }
        }
    }

    /// Show the alert text with the right style, or clear both.
    fn apply_alert(&self, change: &AlertChange) {
        let text = match change {
            AlertChange::Leave => return,
            AlertChange::Clear => "",
            AlertChange::Show(_, text) => text.as_str(),
        };

        let classes = self.alert.class_list();
        for kind in AlertKind::ALL {
            if let Err(err) = classes.remove_1(kind.css_class()) {
                tracing::error!(?err, "could not remove alert class");
            }
        }

        if let AlertChange::Show(kind, _) = change {
            if let Err(err) = classes.add_1(kind.css_class()) {
                tracing::error!(?err, "could not add alert class");
            }
        }

        self.alert_message.set_text_content(Some(text));
    }

    /// Read the form the same way the browser would submit it. File inputs
    /// are skipped; the registration form doesn't have any.
    ///
    /// ## Errors
    ///
    /// Fails if the browser can't read the form.
    pub fn submission(&self) -> Result<Submission, JsValue> {
        let data = FormData::new_with_form(&self.form)?;
        let mut submission = Submission::new();

        let Some(entries) = js_sys::try_iter(&data)? else {
            return Ok(submission);
        };

        for entry in entries {
            let entry: js_sys::Array = entry?.dyn_into()?;

            if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string())
            {
                submission.push(name, value);
            }
        }

        Ok(submission)
    }
}

/// What we've put into the message nodes so far.
#[derive(Debug, Default)]
struct Written {
    /// The last set of validation messages we rendered
    batch: u64,

    /// Fields whose error node holds our text
    fields: BTreeSet<String>,

    /// Whether the alert holds our text
    alert: bool,
}

/// What to do to the message nodes to match the page.
#[derive(Debug, PartialEq, Eq)]
struct Changes {
    /// Empty every `.error` node first
    clear_all_fields: bool,

    /// Empty these fields' error nodes
    clear_fields: Vec<String>,

    /// Write these messages to these fields' error nodes
    write_fields: Vec<(String, String)>,

    /// What to do with the alert
    alert: AlertChange,
}

/// What to do with the alert area.
#[derive(Debug, PartialEq, Eq)]
enum AlertChange {
    /// Nothing of ours is there and nothing should be
    Leave,

    /// Remove the message we put there
    Clear,

    /// Show this message
    Show(AlertKind, String),
}

impl Written {
    /// Work out the changes needed to show `page`, and remember them as done.
    fn update(&mut self, page: &Page) -> Changes {
        let current: BTreeMap<String, String> = page
            .field_errors()
            .map(|(field, text)| (field.to_string(), text.to_string()))
            .collect();

        let clear_all_fields = page.field_error_batch() != self.batch;
        self.batch = page.field_error_batch();

        let clear_fields = if clear_all_fields {
            Vec::new()
        } else {
            self.fields
                .iter()
                .filter(|field| !current.contains_key(*field))
                .cloned()
                .collect()
        };

        self.fields = current.keys().cloned().collect();

        let alert = match page.alert() {
            Some(alert) => {
                self.alert = true;
                AlertChange::Show(alert.kind(), alert.text().to_string())
            }
            None if self.alert => {
                self.alert = false;
                AlertChange::Clear
            }
            None => AlertChange::Leave,
        };

        Changes {
            clear_all_fields,
            clear_fields,
            write_fields: current.into_iter().collect(),
            alert,
        }
    }
}

/// Find a single element and make sure it's the type we expect.
fn query<T: JsCast>(document: &Document, selector: &str) -> Result<T, JsValue> {
    document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element {selector}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("unexpected element type for {selector}")))
}
