//! Name normalization shared by the parser and the source emitter.

/// `@MsgHeader` → `msg_header`, `payloadLen` → `payload_len`.
///
/// A leading `@` or `$` is dropped. Runs of capitals stay together
/// (`HTTPReply` → `http_reply`).
pub fn snake_case(name: &str) -> String {
    let name = name.trim_start_matches(['@', '$']);
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `msg_header` → `MsgHeader`.
pub fn pascal_case(name: &str) -> String {
    snake_case(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("@MsgHeader"), "msg_header");
        assert_eq!(snake_case("payloadLen"), "payload_len");
        assert_eq!(snake_case("HTTPReply"), "http_reply");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("$count"), "count");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("@msg_header"), "MsgHeader");
        assert_eq!(pascal_case("Idle"), "Idle");
        assert_eq!(pascal_case("idle_else_if_2"), "IdleElseIf2");
    }
}
