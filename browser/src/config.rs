//! Build-time configuration for the registration page with an optional runtime
//! override. The runtime config is read from `window.SIGNUP_CONFIG` (if
//! present) so static deployments can change endpoints without rebuilding.
//! Configuration values are public; do not store secrets here.

use signup_core::api::{self, login};

/// Page configuration derived from build-time environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Where the registration API lives. Empty means "the page's own origin".
    pub api_base_url: String,

    /// Where to send people after they register.
    pub login_path: String,
}

impl BrowserConfig {
    /// Loads config from build-time environment variables and applies runtime overrides.
    pub fn load() -> Self {
        let mut config = Self {
            api_base_url: option_env!("SIGNUP_API_BASE_URL")
                .unwrap_or("")
                .to_string(),
            login_path: option_env!("SIGNUP_LOGIN_PATH")
                .unwrap_or(login::PATH)
                .to_string(),
        };

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }

    /// The server to send registrations to, falling back to the page's origin.
    pub fn server(&self, origin: &str) -> String {
        let base = self.api_base_url.trim().trim_end_matches('/');

        if base.is_empty() {
            origin.to_string()
        } else {
            base.to_string()
        }
    }

    /// Where to send people once they've registered. The login page is served
    /// next to the registration page, so this is resolved against the page's
    /// origin rather than the API server.
    pub fn login_url(&self, origin: &str) -> String {
        api::Client::new(origin.to_string())
            .url(&self.login_path)
            .map_or_else(|_| self.login_path.clone(), |url| url.to_string())
    }
}

/// Values set on `window.SIGNUP_CONFIG`
#[derive(Default)]
struct RuntimeConfig {
    /// Overrides `BrowserConfig::api_base_url`
    api_base_url: Option<String>,

    /// Overrides `BrowserConfig::login_path`
    login_path: Option<String>,
}

/// Replace any config values that were set at runtime.
fn apply_runtime_overrides(config: &mut BrowserConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.login_path {
        config.login_path = value;
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("SIGNUP_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    Some(RuntimeConfig {
        api_base_url: read_runtime_value(&object, "api_base_url"),
        login_path: read_runtime_value(&object, "login_path"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key))
        .ok()?
        .as_string()?;
    normalize_runtime_value(&value)
}

/// Trim a runtime value, treating blank values as unset.
#[cfg(any(test, target_arch = "wasm32"))]
fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
