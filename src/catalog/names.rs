/// Drop one matching pair of surrounding double quotes, if present.
pub fn unquote_identifier(ident: &str) -> &str {
    if ident.len() >= 2 && ident.starts_with('"') && ident.ends_with('"') {
        &ident[1..ident.len() - 1]
    } else {
        ident
    }
}

/// Byte offsets of every `.` separator sitting outside double quotes.
///
/// Dots inside quoted identifiers (`"my.schema"."table.name"`) are part of
/// the identifier, not separators.
fn unquoted_dots(name: &str) -> impl Iterator<Item = usize> + '_ {
    let mut quoted = false;
    name.char_indices().filter_map(move |(idx, ch)| {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == '.' && !quoted {
            return Some(idx);
        }
        None
    })
}

/// Strip the leading `schema.` qualifier, if any.
///
/// Only the first dot-component is removed.
pub fn strip_schema_prefix(name: &str) -> &str {
    match unquoted_dots(name).next() {
        Some(dot) => &name[dot + 1..],
        None => name,
    }
}

/// Split a possibly schema-qualified name at its last separator into
/// `(qualifier, relation)`, keeping any surrounding quotes on both parts.
pub fn split_qualified(name: &str) -> (Option<String>, String) {
    match unquoted_dots(name).last() {
        Some(dot) => (
            Some(name[..dot].trim().to_string()),
            name[dot + 1..].trim().to_string(),
        ),
        None => (None, name.trim().to_string()),
    }
}

/// Sanitize a raw table or column identifier for name generation.
///
/// Quoted/exotic identifiers (marker supplied by the catalog) have each run
/// of non-word characters replaced with `_`; plain identifiers only lose
/// their `schema.` prefix.
pub fn sanitize(raw: &str, quoted: bool) -> String {
    if quoted {
        let mut out = String::with_capacity(raw.len());
        let mut previous_was_underscore = false;
        for ch in unquote_identifier(raw).chars() {
            if ch.is_alphanumeric() || ch == '_' {
                out.push(ch);
                previous_was_underscore = ch == '_';
            } else if !previous_was_underscore {
                out.push('_');
                previous_was_underscore = true;
            }
        }
        out
    } else {
        strip_schema_prefix(raw).to_string()
    }
}

/// Split an identifier into lowercase words.
///
/// Word boundaries are underscores, lower→upper case transitions
/// (camelCase and PascalCase), acronym→word transitions (`HTMLParser` ->
/// `html`, `parser`), and letter↔digit transitions:
/// `fooID3bar` -> `["foo", "id", "3", "bar"]`.
pub fn split_name(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            flush(&mut words, &mut current);
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let case_boundary = prev.is_lowercase() && ch.is_uppercase();
            let digit_boundary = prev.is_alphabetic() != ch.is_alphabetic()
                && prev != '_'
                && (prev.is_ascii_digit() || ch.is_ascii_digit());
            // End of an acronym: "HTMLParser" splits before the 'P'.
            let acronym_boundary = prev.is_uppercase()
                && ch.is_lowercase()
                && current.chars().count() > 1;

            if case_boundary || digit_boundary {
                flush(&mut words, &mut current);
            } else if acronym_boundary {
                let last = current.pop();
                flush(&mut words, &mut current);
                if let Some(last) = last {
                    current.push(last);
                }
            }
        }

        current.extend(ch.to_lowercase());
    }
    flush(&mut words, &mut current);
    words
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

/// Lowercased, underscore-joined form of a sanitized identifier.
pub fn normalize(name: &str) -> String {
    split_name(name).join("_")
}

/// Strip a trailing `_id` (case-insensitive) from a column-derived name.
///
/// Returns the input unchanged when stripping would leave nothing.
pub fn strip_id_suffix(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if let Some(stem_len) = lower.strip_suffix("_id").map(str::len) {
        if stem_len > 0 {
            return &name[..stem_len];
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_schema_prefix_handles_quoted_dots() {
        assert_eq!(strip_schema_prefix("public.docs"), "docs");
        assert_eq!(
            strip_schema_prefix(r#""my.schema"."table.name""#),
            r#""table.name""#
        );
        assert_eq!(strip_schema_prefix("docs"), "docs");
    }

    #[test]
    fn split_qualified_keeps_quotes_and_handles_quoted_dots() {
        assert_eq!(
            split_qualified("public.docs"),
            (Some("public".to_string()), "docs".to_string())
        );
        assert_eq!(split_qualified("docs"), (None, "docs".to_string()));
        assert_eq!(
            split_qualified(r#""my.schema"."table.name""#),
            (
                Some(r#""my.schema""#.to_string()),
                r#""table.name""#.to_string()
            )
        );
    }

    #[test]
    fn sanitize_plain_identifier_only_loses_schema() {
        assert_eq!(sanitize("public.order_line", false), "order_line");
        assert_eq!(sanitize("order_line", false), "order_line");
    }

    #[test]
    fn sanitize_quoted_identifier_scrubs_exotic_characters() {
        assert_eq!(sanitize(r#""user docs""#, true), "user_docs");
        assert_eq!(sanitize("weird-name!!here", true), "weird_name_here");
    }

    #[test]
    fn split_name_handles_underscores_case_and_digits() {
        assert_eq!(split_name("order_line"), vec!["order", "line"]);
        assert_eq!(split_name("fooID3bar"), vec!["foo", "id", "3", "bar"]);
        assert_eq!(split_name("OrderLine"), vec!["order", "line"]);
        assert_eq!(split_name("HTMLParser"), vec!["html", "parser"]);
        assert_eq!(split_name("__trailing__"), vec!["trailing"]);
    }

    #[test]
    fn normalize_is_lowercase_underscore_joined() {
        assert_eq!(normalize("OrderLine"), "order_line");
        assert_eq!(normalize("fooID3bar"), "foo_id_3_bar");
    }

    #[test]
    fn strip_id_suffix_is_case_insensitive_and_keeps_bare_id() {
        assert_eq!(strip_id_suffix("author_id"), "author");
        assert_eq!(strip_id_suffix("author_ID"), "author");
        assert_eq!(strip_id_suffix("author"), "author");
        assert_eq!(strip_id_suffix("_id"), "_id");
        assert_eq!(strip_id_suffix("id"), "id");
    }
}
