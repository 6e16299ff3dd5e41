//! String utilities for the domain layer.

/// Python keywords that cannot be used as identifiers
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Convert an arbitrary name (`getOrder`, `Get Order`, `get-order`) to snake_case.
///
/// Non-alphanumeric characters become word separators. An empty result
/// becomes `"_"` so the output is always usable as an identifier stem.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() {
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_ascii_uppercase() => {
                        next.is_some_and(|n| n.is_ascii_lowercase())
                    }
                    _ => false,
                };
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Convert an arbitrary name to PascalCase (`order_api` -> `OrderApi`).
pub fn to_pascal_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Make a name safe to use as a Python identifier.
///
/// Snake-cases the name, prefixes a leading digit with `_` and suffixes
/// keywords with `_`.
pub fn python_identifier(s: &str) -> String {
    let mut ident = to_snake_case(s);
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if PYTHON_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("getOrder"), "get_order");
        assert_eq!(to_snake_case("GetOrderByID"), "get_order_by_id");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Get Order"), "get_order");
        assert_eq!(to_snake_case("get-order/{id}"), "get_order_id");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("--"), "_");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("airline booking"), "AirlineBooking");
        assert_eq!(to_pascal_case("orderApi"), "OrderApi");
    }

    #[test]
    fn test_python_identifier() {
        assert_eq!(python_identifier("from"), "from_");
        assert_eq!(python_identifier("2fa-code"), "_2fa_code");
        assert_eq!(python_identifier("userId"), "user_id");
    }
}
