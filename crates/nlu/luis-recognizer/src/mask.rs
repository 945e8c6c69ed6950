/// Masks an API key for logging: first 4 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer become "***".
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..4], &token[len - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(""), "***");
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("0123456789abcdef"), "0123***cdef");
    }
}
