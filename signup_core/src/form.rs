use reqwest::multipart::Form;

/// The name of the hidden field the server renders the CSRF token into.
pub const CSRF_FIELD: &str = "csrf_token";

/// Everything the user entered into the registration form, in the order the
/// form presented it. This mirrors the browser's `FormData`: names can repeat,
/// and we don't interpret values beyond finding the CSRF token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Field name and value pairs
    fields: Vec<(String, String)>,
}

impl Submission {
    /// Construct an empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the end of the submission.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style version of `push`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Get the first value submitted under this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// The CSRF token to send along in the request header. A form without a
    /// token sends an empty header, and the server decides what to do.
    pub fn csrf_token(&self) -> &str {
        self.get(CSRF_FIELD).unwrap_or_default()
    }

    /// All the fields, in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Encode the fields as a multipart form body.
    pub fn to_multipart(&self) -> Form {
        self.fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            })
    }
}

impl<N, V> FromIterator<(N, V)> for Submission
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
