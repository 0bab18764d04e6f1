//! Escape sequence processing for string and char literals.

/// Result of unescaping a literal body.
pub enum Unescaped {
    Ok(String),
    /// The byte offset (within the body) and the offending escape char.
    Invalid { offset: usize, found: char },
}

/// Process escape sequences in a literal body (quotes already stripped).
///
/// Recognized escapes: `\n \t \r \0 \\ \" \'`.
pub fn unescape(body: &str) -> Unescaped {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => out.push('\n'),
            Some((_, 't')) => out.push('\t'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, '0')) => out.push('\0'),
            Some((_, '\\')) => out.push('\\'),
            Some((_, '"')) => out.push('"'),
            Some((_, '\'')) => out.push('\''),
            Some((_, found)) => {
                return Unescaped::Invalid { offset, found };
            }
            None => {
                return Unescaped::Invalid {
                    offset,
                    found: '\\',
                };
            }
        }
    }
    Unescaped::Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_known_sequences() {
        match unescape(r#"a\nb\\c\"d"#) {
            Unescaped::Ok(s) => assert_eq!(s, "a\nb\\c\"d"),
            Unescaped::Invalid { .. } => panic!("expected valid escapes"),
        }
    }

    #[test]
    fn reports_bad_escape_position() {
        match unescape(r"ab\qcd") {
            Unescaped::Invalid { offset, found } => {
                assert_eq!(offset, 2);
                assert_eq!(found, 'q');
            }
            Unescaped::Ok(_) => panic!("expected invalid escape"),
        }
    }

    #[test]
    fn escape_round_trips() {
        let original = "line1\nline2\t\"quoted\"";
        match unescape(&calor_ir::escape_literal(original)) {
            Unescaped::Ok(s) => assert_eq!(s, original),
            Unescaped::Invalid { .. } => panic!("round trip failed"),
        }
    }
}
