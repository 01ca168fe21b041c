//! Provider name conversions.
//!
//! Templates refer to the same provider in several spellings:
//! `remote_job_provider`, `StdLib::remote_job_provider`, `RemoteJobProvider`
//! and `Foo.Bar.RemoteJobProvider` all name one canonical Pascal-case
//! identity. These helpers convert between them.

/// Convert `snake_case` to `PascalCase`.
///
/// Splits on `_`, drops empty segments, uppercases the first character of each
/// segment and lowercases the rest.
///
/// ```rust
/// use buildout_lens::naming::pascal_case;
///
/// assert_eq!(pascal_case("remote_job_provider"), "RemoteJobProvider");
/// assert_eq!(pascal_case("__http__get"), "HttpGet");
/// ```
#[must_use]
pub fn pascal_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for segment in snake.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Convert `PascalCase` to `snake_case`.
///
/// An underscore is inserted before every uppercase character except the
/// first; the result is lowercased.
#[must_use]
pub fn snake_case(pascal: &str) -> String {
    let mut out = String::with_capacity(pascal.len() + 4);
    for (i, ch) in pascal.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split `Library::provider` on the first `::`.
///
/// Returns `None` when the token is not library-qualified.
#[must_use]
pub fn split_library_provider(token: &str) -> Option<(&str, &str)> {
    token.split_once("::")
}

/// Class name of a fully qualified `RPClass` (text after the last `.`).
#[must_use]
pub fn provider_name_from_rp_class(rp_class: &str) -> &str {
    rp_class.rsplit('.').next().unwrap_or(rp_class).trim()
}

/// True for tokens written as snake_case aliases: not starting uppercase,
/// not library-qualified and containing an underscore.
#[must_use]
pub fn is_snake_case(token: &str) -> bool {
    !starts_uppercase(token) && !token.contains("::") && token.contains('_')
}

/// True when the first character is uppercase.
#[must_use]
pub fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}
