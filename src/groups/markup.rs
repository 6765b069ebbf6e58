//! Escaping for text shown through Pango markup.
//!
//! Table cells hold escaped text so they can be handed to `Label::set_markup`
//! directly; anything sent back to the server must be unescaped first.

pub fn escape(input: &str) -> String {
    glib::markup_escape_text(input).to_string()
}

const ENTITIES: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

/// Inverse of [`escape`]. Unknown entities are left as written.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
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
    fn escapes_markup_characters() {
        assert_eq!(escape("R&D <ops>"), "R&amp;D &lt;ops&gt;");
        let quoted = escape("\"x\" 'y'");
        assert!(!quoted.contains('"') && !quoted.contains('\''));
    }

    #[test]
    fn unescape_reverses_escape() {
        for raw in ["Tom & Jerry", "<script>alert(1)</script>", "O'Brien", "&amp; literally", "plain"] {
            assert_eq!(unescape(&escape(raw)), raw);
        }
    }

    #[test]
    fn unknown_entities_survive() {
        assert_eq!(unescape("a &nbsp; b & c"), "a &nbsp; b & c");
        assert_eq!(unescape("&apos;"), "'");
    }
}
