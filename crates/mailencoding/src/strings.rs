/// Fold a `Name: value` header line at spaces so that no physical
/// line exceeds 76 columns, inserting `CRLF + space` continuations
/// per RFC 5322. The space following the colon is part of the
/// separator and is never a fold point. Values that already contain
/// `\r\n ` sequences (pre-folded address lists) reset the running
/// column rather than being folded again. A single token wider than
/// the budget is emitted unbroken.
pub(crate) fn fold_header_line(name: &str, value: &str) -> String {
    let mut out = String::with_capacity(name.len() + value.len() + 8);
    out.push_str(name);
    out.push_str(": ");
    let mut col = name.len() + 2;
    let mut first = true;
    for word in value.split(' ') {
        // Only the leading run of the word lands on the current line
        // when the word carries an embedded fold
        let head = word.split("\r\n").next().unwrap_or(word).len();
        if first {
            first = false;
        } else if col + 1 + head > 76 {
            out.push_str("\r\n ");
            col = 1;
        } else {
            out.push(' ');
            col += 1;
        }
        out.push_str(word);
        match word.rsplit_once("\r\n") {
            Some((_, tail)) => col = tail.len(),
            None => col += word.len(),
        }
    }
    out
}

/// Transliterate to ASCII for use in RFC 2045/2231 header parameters.
/// Common Latin letters lose their diacritics; anything else outside
/// ASCII becomes an underscore.
pub fn to_ascii(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(transliterate(c).unwrap_or("_"));
        }
    }
    out
}

fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'À'..='Å' => "A",
        'à'..='å' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' => "C",
        'ç' => "c",
        'È'..='Ë' => "E",
        'è'..='ë' => "e",
        'Ì'..='Ï' => "I",
        'ì'..='ï' => "i",
        'Ð' => "D",
        'ð' => "d",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò'..='Ö' | 'Ø' => "O",
        'ò'..='ö' | 'ø' => "o",
        'Ù'..='Ü' => "U",
        'ù'..='ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        'Þ' => "Th",
        'þ' => "th",
        'ß' => "ss",
        'Œ' => "OE",
        'œ' => "oe",
        'Š' => "S",
        'š' => "s",
        'Ž' => "Z",
        'ž' => "z",
        '«' | '»' | '“' | '”' | '„' => "\"",
        '‘' | '’' | '‚' => "'",
        '–' | '—' => "-",
        '…' => "...",
        _ => return None,
    })
}

/// Quote input string `s`, using a backslash escape,
/// any of the characters listed in needs_quote
pub(crate) fn quote_string(s: &str, needs_quote: &str) -> String {
    if s.chars().any(|c| needs_quote.contains(c)) {
        let mut result = String::with_capacity(s.len() + 4);
        result.push('"');
        for c in s.chars() {
            if needs_quote.contains(c) {
                result.push('\\');
            }
            result.push(c);
        }
        result.push('"');
        result
    } else {
        s.to_string()
    }
}

/// Render a Content-ID or Message-ID value in angle-bracket form.
pub(crate) fn to_id_header(id: &str) -> String {
    format!("<{id}>")
}
