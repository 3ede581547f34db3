use crate::game::constants::DEFAULT_SESSION;

pub fn sanitize_session_name(value: &str) -> String {
    let mut cleaned = String::with_capacity(value.len().min(64));
    for ch in value.trim().chars() {
        if cleaned.len() >= 64 {
            break;
        }
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            cleaned.push(ch);
        }
    }
    if cleaned.is_empty() {
        return DEFAULT_SESSION.to_string();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unsafe_characters() {
        assert_eq!(sanitize_session_name(" table/7 <b>"), "table7b");
    }

    #[test]
    fn empty_names_use_the_default_session() {
        assert_eq!(sanitize_session_name("   "), DEFAULT_SESSION);
        assert_eq!(sanitize_session_name("../"), DEFAULT_SESSION);
    }

    #[test]
    fn long_names_are_capped() {
        let name = "a".repeat(100);
        assert_eq!(sanitize_session_name(&name).len(), 64);
    }
}
