//! Placeholder substitution for the email layout.
//!
//! The syntax is a small subset of Handlebars:
//!
//! - `{{path}}` inserts the value at `path`, HTML-escaped.
//! - `{{{path}}}` inserts the value at `path` as is.
//! - `path` walks nested objects, segments separated by `.` or `/`. A leading
//!   `this.` is ignored and `{{this}}` refers to the whole context.
//! - `{{! ... }}` and `{{!-- ... --}}` are comments and produce nothing.
//! - `\{{` produces a literal `{{`.
//!
//! Missing values and `null` render as an empty string, numbers and booleans
//! in their JSON form, arrays as their scalar elements joined by `,`, objects
//! as nothing. Blocks, partials and helpers are rejected.

use std::path::Path;

use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unclosed tag starting at byte {0}")]
    Unclosed(usize),
    #[error("unsupported tag `{tag}` at byte {offset}")]
    Unsupported { tag: String, offset: usize },
}

/// Reads the layout from disk. Called on every request, nothing is cached.
pub async fn load_layout(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}

pub fn render(layout: &str, variables: &Value) -> Result<String, RenderError> {
    let mut out = String::with_capacity(layout.len());
    let mut rest = layout;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        if rest[..start].ends_with('\\') {
            out.push_str(&rest[..start - 1]);
            out.push_str("{{");
            advance(&mut rest, &mut offset, start + 2);
            continue;
        }

        out.push_str(&rest[..start]);
        let tag_offset = offset + start;
        advance(&mut rest, &mut offset, start);

        let (open, close, raw) = if rest.starts_with("{{{") {
            ("{{{", "}}}", true)
        } else if rest.starts_with("{{!--") {
            ("{{!--", "--}}", false)
        } else {
            ("{{", "}}", false)
        };

        let end = rest[open.len()..]
            .find(close)
            .ok_or(RenderError::Unclosed(tag_offset))?;
        let inner = &rest[open.len()..open.len() + end];
        advance(&mut rest, &mut offset, open.len() + end + close.len());

        if open == "{{!--" || inner.starts_with('!') {
            continue;
        }

        let expr = inner.trim();
        let value = lookup(variables, parse_path(expr, tag_offset)?);
        let text = stringify(value);
        if raw {
            out.push_str(&text);
        } else {
            out.push_str(&html_escape::encode_quoted_attribute(&text));
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn advance(rest: &mut &str, offset: &mut usize, by: usize) {
    *rest = &rest[by..];
    *offset += by;
}

fn parse_path(expr: &str, offset: usize) -> Result<Vec<&str>, RenderError> {
    let unsupported = || RenderError::Unsupported {
        tag: expr.to_string(),
        offset,
    };

    if expr.is_empty()
        || expr == "else"
        || expr.starts_with(['#', '/', '^', '>', '&', '~'])
        || expr.contains(char::is_whitespace)
    {
        return Err(unsupported());
    }

    let mut segments: Vec<&str> = expr.split(['.', '/']).collect();
    if segments.first() == Some(&"this") {
        segments.remove(0);
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(unsupported());
    }
    Ok(segments)
}

fn lookup<'a>(root: &'a Value, path: Vec<&str>) -> Option<&'a Value> {
    path.into_iter().try_fold(root, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Object(_)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_object() && !item.is_array())
            .map(|item| stringify(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_top_level_names() {
        let html = render("<p>Hello {{name}}!</p>", &json!({"name": "Ann"})).unwrap();
        assert_eq!(html, "<p>Hello Ann!</p>");
    }

    #[test]
    fn tolerates_inner_whitespace() {
        let html = render("{{ name }}", &json!({"name": "Ann"})).unwrap();
        assert_eq!(html, "Ann");
    }

    #[test]
    fn walks_nested_fields() {
        let vars = json!({"styles": {"header": {"color": "#333"}}, "list": ["a", "b"]});
        let html = render(
            "{{styles.header.color}}|{{this.styles.header.color}}|{{styles/header/color}}|{{list.1}}",
            &vars,
        )
        .unwrap();
        assert_eq!(html, "#333|#333|#333|b");
    }

    #[test]
    fn escapes_double_and_keeps_triple_raw() {
        let vars = json!({"content": "<p>\"Hi\" & bye</p>"});
        let html = render("{{content}}|{{{content}}}", &vars).unwrap();
        assert_eq!(
            html,
            "&lt;p&gt;&quot;Hi&quot; &amp; bye&lt;/p&gt;|<p>\"Hi\" & bye</p>"
        );
    }

    #[test]
    fn empty_variables_blank_every_placeholder() {
        let layout = "<html>\n<h1>{{title}}</h1>{{{content}}}<footer>{{styles.footer.color}}</footer>\n</html>";
        let html = render(layout, &json!({})).unwrap();
        assert_eq!(html, "<html>\n<h1></h1><footer></footer>\n</html>");
    }

    #[test]
    fn non_object_context_blanks_placeholders() {
        assert_eq!(render("a{{x}}b", &json!([1, 2])).unwrap(), "ab");
        assert_eq!(render("a{{x}}b", &Value::Null).unwrap(), "ab");
    }

    #[test]
    fn scalars_arrays_and_objects() {
        let vars = json!({"n": 3.5, "b": false, "z": null, "a": [1, "x", {"k": 1}], "o": {"k": 1}});
        let html = render("{{n}}|{{b}}|{{z}}|{{a}}|{{o}}", &vars).unwrap();
        assert_eq!(html, "3.5|false||1,x|");
    }

    #[test]
    fn this_is_the_whole_context() {
        assert_eq!(render("{{this}}", &json!("plain")).unwrap(), "plain");
    }

    #[test]
    fn comments_are_dropped() {
        let html = render("a{{! note }}b{{!-- has }} inside --}}c", &json!({})).unwrap();
        assert_eq!(html, "abc");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let html = render(r"\{{name}} {{name}}", &json!({"name": "Ann"})).unwrap();
        assert_eq!(html, "{{name}} Ann");
    }

    #[test]
    fn text_without_tags_is_untouched() {
        let layout = "<style>body { color: red; }</style> } { ünïcödé";
        assert_eq!(render(layout, &json!({"x": 1})).unwrap(), layout);
    }

    #[test]
    fn unclosed_tag_is_an_error() {
        assert_eq!(
            render("ok {{name", &json!({})),
            Err(RenderError::Unclosed(3))
        );
    }

    #[test]
    fn blocks_and_helpers_are_rejected() {
        for layout in ["{{#if x}}y{{/if}}", "{{> partial}}", "{{upper name}}", "{{}}", "{{a..b}}"] {
            assert!(
                matches!(render(layout, &json!({})), Err(RenderError::Unsupported { .. })),
                "{layout} should be rejected"
            );
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let layout = "{{a}}-{{{b.c}}}-{{d}}";
        let vars = json!({"a": "<x>", "b": {"c": "<y>"}, "d": [1, 2]});
        assert_eq!(render(layout, &vars), render(layout, &vars));
    }

    #[tokio::test]
    async fn missing_layout_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_layout(&dir.path().join("nope.html")).await.is_err());
    }
}
