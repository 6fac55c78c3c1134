//! Literal placeholder substitution for service templates
//!
//! Deliberately not a template language: no conditionals, no loops, no
//! expressions. `{{NAME}}` tokens are replaced with their values in a
//! single pass over the input.

/// Render a template by substituting `{{NAME}}` placeholders.
///
/// Every occurrence of each recognized placeholder is replaced with its
/// value. Unrecognized placeholders are left verbatim. Substitution is
/// single-pass: a substituted value is never re-scanned, so a value
/// containing `{{OTHER}}` stays literal in the output.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let at_brace = &rest[start..];

        for (key, value) in vars {
            let token = format!("{{{{{}}}}}", key);
            if at_brace.starts_with(&token) {
                out.push_str(value);
                rest = &at_brace[token.len()..];
                continue 'scan;
            }
        }

        // Not a recognized placeholder, keep the braces as-is
        out.push_str("{{");
        rest = &at_brace[2..];
    }

    out.push_str(rest);
    out
}
