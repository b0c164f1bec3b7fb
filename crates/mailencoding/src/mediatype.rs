/// RFC 2045 token characters: printable US-ASCII excluding tspecials
/// and space.
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

fn is_valid_value(value: &str) -> bool {
    !value.is_empty()
        && value.matches('/').count() <= 1
        && value
            .split('/')
            .all(|part| !part.is_empty() && part.chars().all(is_token_char))
}

/// Format a media type (or disposition) value with its parameters,
/// e.g. `text/plain; charset=utf-8`. Parameters are emitted in name
/// order; parameters with empty values are skipped. Values that are
/// not plain tokens are quoted. Returns None when the value or a
/// parameter cannot be represented; callers fall back to the bare
/// value string rather than failing the encode.
pub(crate) fn format_media_type(value: &str, params: &[(&str, &str)]) -> Option<String> {
    if !is_valid_value(value) {
        return None;
    }
    let mut result = value.to_ascii_lowercase();

    let mut params: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    params.sort_by(|a, b| a.0.cmp(b.0));

    for (name, v) in params {
        if name.is_empty() || !name.chars().all(is_token_char) {
            return None;
        }
        let rendered = if v.chars().all(is_token_char) {
            v.to_string()
        } else if v
            .chars()
            .all(|c| c == ' ' || c == '\t' || c.is_ascii_graphic())
        {
            let mut quoted = String::with_capacity(v.len() + 2);
            quoted.push('"');
            for c in v.chars() {
                if c == '"' || c == '\\' {
                    quoted.push('\\');
                }
                quoted.push(c);
            }
            quoted.push('"');
            quoted
        } else {
            return None;
        };
        result.push_str("; ");
        result.push_str(name);
        result.push('=');
        result.push_str(&rendered);
    }
    Some(result)
}
