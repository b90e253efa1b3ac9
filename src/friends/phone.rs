//! Phone number normalization shared by user lookup and profile updates.

/// Keeps only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The digits of `raw` plus the domestic/international counterpart:
/// a leading `0` becomes `62` and a leading `62` becomes `0`.
/// Empty when `raw` carries no digits.
pub fn phone_variants(raw: &str) -> Vec<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Vec::new();
    }
    let alternate = if let Some(rest) = digits.strip_prefix('0') {
        Some(format!("62{rest}"))
    } else {
        digits.strip_prefix("62").map(|rest| format!("0{rest}"))
    };
    let mut out = vec![digits];
    out.extend(alternate);
    out
}

/// Free text counts as a phone number when it has at least five digits and
/// nothing but digits and `+ - ( )` or spaces.
pub fn looks_like_phone(text: &str) -> bool {
    let mut digits = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '+' | '-' | '(' | ')' | ' ' => {}
            _ => return false,
        }
    }
    digits >= 5
}
