pub mod catalog;
pub mod checkout;
pub mod orders;

/// Trim `input`, collapse whitespace runs into single spaces and drop control
/// characters.
pub(crate) fn sanitize_inline(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            pending_space = !sanitized.is_empty();
        } else if !ch.is_control() {
            if pending_space {
                sanitized.push(' ');
                pending_space = false;
            }
            sanitized.push(ch);
        }
    }

    sanitized
}

/// Sanitize an optional field, mapping blank values to `None`.
pub(crate) fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_inline).filter(|value| !value.is_empty())
}

/// Sanitize free text, keeping single line breaks between non-empty lines.
pub(crate) fn sanitize_multiline(input: &str) -> String {
    input
        .lines()
        .map(sanitize_inline)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
