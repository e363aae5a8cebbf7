//! The "imperative shell" around `Page` in the browser: DOM events become
//! actions, and effects become fetches, timeouts, and navigation.

use crate::dom::Dom;
use gloo_timers::callback::Timeout;
use signup_core::{
    api,
    page::{Action, Effect},
    timer::as_millis_u32,
    Page, TimerId,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Event, Window};

/// Everything the registration page needs while it's open.
pub struct Shell {
    /// The page state. Only `dispatch` touches this.
    page: RefCell<Page>,

    /// The elements we render into
    dom: Dom,

    /// For navigating away once registered
    window: Window,

    /// The registration server
    client: api::Client,

    /// Shared HTTP client (this is `fetch` under the hood)
    http: reqwest::Client,

    /// Where to go once registered
    login_url: String,

    /// Pending clears. Dropping a `Timeout` cancels it.
    timers: RefCell<HashMap<TimerId, Timeout>>,
}

impl Shell {
    /// Set up the shell and render the initial state.
    pub fn new(window: Window, dom: Dom, client: api::Client, login_url: String) -> Rc<Self> {
        let shell = Rc::new(Self {
            page: RefCell::new(Page::default()),
            dom,
            window,
            client,
            http: reqwest::Client::new(),
            login_url,
            timers: RefCell::new(HashMap::new()),
        });

        shell.dom.render(&shell.page.borrow());

        shell
    }

    /// Listen for the checkbox and form events. The listeners live as long as
    /// the page does.
    ///
    /// ## Errors
    ///
    /// Fails if the browser won't let us add a listener.
    pub fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let shell = Rc::clone(self);
        let on_toggle = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let checked = shell.dom.show.checked();
            shell.dispatch(Action::PasswordsToggled(checked));
        });
        self.dom
            .show
            .add_event_listener_with_callback("change", on_toggle.as_ref().unchecked_ref())?;
        on_toggle.forget();

        let shell = Rc::clone(self);
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();

            match shell.dom.submission() {
                Ok(submission) => shell.dispatch(Action::Submitted(submission)),
                Err(err) => tracing::error!(?err, "could not read the registration form"),
            }
        });
        self.dom
            .form
            .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
        on_submit.forget();

        Ok(())
    }

    /// Feed an action to the page, re-render, and perform whatever it asks for.
    pub fn dispatch(self: &Rc<Self>, action: Action) {
        let effects = self.page.borrow_mut().handle(action);

        self.dom.render(&self.page.borrow());

        for effect in effects {
            self.perform(effect);
        }
    }

    /// Do one thing the page asked for.
    fn perform(self: &Rc<Self>, effect: Effect) {
        match effect {
            Effect::Register(submission) => {
                let shell = Rc::clone(self);

                wasm_bindgen_futures::spawn_local(async move {
                    let resp = shell.client.register(&shell.http, &submission).await;
                    shell.dispatch(Action::Responded(resp));
                });
            }

            Effect::StartTimer(id, after) => {
                let shell = Rc::clone(self);
                let timeout = Timeout::new(as_millis_u32(after), move || {
                    // wasm-bindgen holds on to a callback until it returns, so
                    // dropping our own handle here is fine.
                    shell.timers.borrow_mut().remove(&id);
                    shell.dispatch(Action::TimerFired(id));
                });

                self.timers.borrow_mut().insert(id, timeout);
            }

            Effect::CancelTimer(id) => {
                self.timers.borrow_mut().remove(&id);
            }

            Effect::RedirectToLogin => {
                if let Err(err) = self.window.location().set_href(&self.login_url) {
                    tracing::error!(?err, "could not navigate to the login page");
                }
            }
        }
    }
}
