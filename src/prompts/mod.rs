//! Prompt templates and the composers that turn stage requests into chat
//! messages.

pub mod compose;
pub mod templates;

pub use compose::Stage;

/// Fill `{name}` placeholders from `values`.
///
/// Brace groups whose name is not in `values` (CSS rules, JavaScript
/// objects, URL patterns) are copied unchanged. Substitution is a single
/// pass: inserted text is never scanned for further placeholders.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_known_placeholders() {
        let out = render(
            "Doc:\n{current_content}\nFix: {feedback}",
            &[("current_content", "v1"), ("feedback", "shorter")],
        );
        assert_eq!(out, "Doc:\nv1\nFix: shorter");
    }

    #[test]
    fn test_render_leaves_unknown_braces() {
        let out = render(
            "body { margin: 0 } GET /demo/{project_id}/data/{key} {code}",
            &[("code", "<p/>")],
        );
        assert_eq!(out, "body { margin: 0 } GET /demo/{project_id}/data/{key} <p/>");
    }

    #[test]
    fn test_render_is_single_pass() {
        let out = render(
            "{a} and {b}",
            &[("a", "literal {b}"), ("b", "B")],
        );
        assert_eq!(out, "literal {b} and B");
    }

    #[test]
    fn test_render_repeated_and_nested_braces() {
        assert_eq!(render("{x}{x}", &[("x", "1")]), "11");
        assert_eq!(render("{{x}}", &[("x", "1")]), "{1}");
        assert_eq!(render("dangling {x", &[("x", "1")]), "dangling {x");
    }
}
