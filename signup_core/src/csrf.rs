use crate::form::CSRF_FIELD;
use regex::Regex;
use std::sync::LazyLock;

/// Matches a whole `<input ...>` tag.
static INPUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("input tag pattern is valid"));

/// Matches one attribute inside a tag, with double, single, or no quotes.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\b([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

/// Find the value of the hidden CSRF input in a rendered registration page.
/// Attribute order and quoting style vary between templates, so we look at
/// each `<input>` tag on its own.
pub fn extract_token(page: &str) -> Option<String> {
    INPUT_TAG.find_iter(page).find_map(|tag| {
        let mut name = None;
        let mut value = None;

        for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
            let Some(key) = caps.get(1) else { continue };
            let Some(val) = caps.get(2).or(caps.get(3)).or(caps.get(4)) else {
                continue;
            };

            match key.as_str().to_ascii_lowercase().as_str() {
                "name" => name = Some(val.as_str()),
                "value" => value = Some(val.as_str()),
                _ => {}
            }
        }

        match (name, value) {
            (Some(CSRF_FIELD), Some(value)) => Some(value.to_string()),
            _ => None,
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn finds_the_hidden_input() {
        let page = r#"
            <form id="register" method="POST">
                <input id="csrf_token" name="csrf_token" type="hidden" value="IjQ5Zj.abc">
                <input id="username" name="username" type="text" value="">
            </form>
        "#;

        assert_eq!(extract_token(page), Some("IjQ5Zj.abc".to_string()));
    }

    #[test]
    fn handles_value_before_name_and_single_quotes() {
        let page = "<input type='hidden' value='tok' name='csrf_token' />";

        assert_eq!(extract_token(page), Some("tok".to_string()));
    }

    #[test]
    fn ignores_other_inputs() {
        let page = r#"<input name="username" value="brian"><input name="email" value="x@y.z">"#;

        assert_eq!(extract_token(page), None);
    }

    #[test]
    fn handles_unquoted_values() {
        let page = "<INPUT NAME=csrf_token VALUE=bare>";

        assert_eq!(extract_token(page), Some("bare".to_string()));
    }

    #[test]
    fn finds_the_token_on_repeated_calls() {
        let page = r#"<input name="csrf_token" value="again">"#;

        assert_eq!(extract_token(page), Some("again".to_string()));
        assert_eq!(extract_token(page), Some("again".to_string()));
    }

    #[test]
    fn patterns_compile() {
        assert!(INPUT_TAG.is_match("<input>"));
        assert!(ATTRIBUTE.is_match("name=x"));
    }
}
