//! Extraction of source code from completion text

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// Extract Python source from a completion.
///
/// Takes the first ` ```python ` (or ` ```py `) fenced block. Falls back to
/// the first non-empty untagged fenced block, then to the whole text.
/// A fence line inside a triple-quoted string is part of the code.
pub fn extract_python_code(response: &str) -> String {
    let mut open_tag: Option<String> = None;
    let mut current = String::new();
    let mut untagged: Option<String> = None;
    let mut open_string: Option<&'static str> = None;

    for line in response.lines() {
        let trimmed = line.trim();
        match &open_tag {
            None => {
                if let Some(tag) = trimmed.strip_prefix("```") {
                    open_tag = Some(tag.trim().to_ascii_lowercase());
                    current.clear();
                    open_string = None;
                }
            }
            Some(tag) if trimmed == "```" && open_string.is_none() => {
                if matches!(tag.as_str(), "python" | "py" | "python3") {
                    return current;
                }
                if tag.is_empty() && untagged.is_none() && !current.trim().is_empty() {
                    untagged = Some(current.clone());
                }
                open_tag = None;
            }
            Some(_) => {
                track_triple_quotes(line, &mut open_string);
                current.push_str(line);
                current.push('\n');
            }
        }
    }

    untagged.unwrap_or_else(|| format!("{}\n", response.trim()))
}

/// Update `open` with the triple-quoted strings opened or closed on `line`.
fn track_triple_quotes(line: &str, open: &mut Option<&'static str>) {
    let mut rest = line;
    loop {
        match *open {
            Some(delimiter) => match rest.find(delimiter) {
                Some(i) => {
                    rest = &rest[i + delimiter.len()..];
                    *open = None;
                }
                None => return,
            },
            None => {
                let first = TRIPLE_QUOTES
                    .into_iter()
                    .filter_map(|d| rest.find(d).map(|i| (i, d)))
                    .min();
                match first {
                    Some((i, delimiter)) => {
                        rest = &rest[i + delimiter.len()..];
                        *open = Some(delimiter);
                    }
                    None => return,
                }
            }
        }
    }
}
