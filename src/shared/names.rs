use crate::game::constants::GUEST_LABEL;

const PREFIX_CHARS: usize = 6;
const SUFFIX_CHARS: usize = 4;

/// `0xC6DA0c...30fF` style label for a wallet address.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.trim().chars().collect();
    if chars.len() <= PREFIX_CHARS + SUFFIX_CHARS {
        return chars.into_iter().collect();
    }
    let prefix: String = chars[..PREFIX_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - SUFFIX_CHARS..].iter().collect();
    format!("{prefix}...{suffix}")
}

pub fn player_label(address: Option<&str>) -> String {
    match address.map(str::trim).filter(|value| !value.is_empty()) {
        Some(address) => short_address(address),
        None => GUEST_LABEL.to_string(),
    }
}
