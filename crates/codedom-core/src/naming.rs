//! Case conversion helpers shared by the refiners.
//!
//! These only touch the first character. Identifiers in the code model
//! already carry the casing chosen by the front-end, so the rest of the
//! name is preserved as-is.

/// Uppercase the first character, keep the rest
///
/// # Examples
/// ```
/// use codedom_core::naming::to_first_character_upper_case;
/// assert_eq!(to_first_character_upper_case("graph"), "Graph");
/// assert_eq!(to_first_character_upper_case("messageRules"), "MessageRules");
/// assert_eq!(to_first_character_upper_case("HTTPProxy"), "HTTPProxy");
/// ```
pub fn to_first_character_upper_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lowercase the first character, keep the rest
///
/// # Examples
/// ```
/// use codedom_core::naming::to_first_character_lower_case;
/// assert_eq!(to_first_character_lower_case("Message"), "message");
/// assert_eq!(to_first_character_lower_case("ObjectMeta"), "objectMeta");
/// ```
pub fn to_first_character_lower_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_first_character_upper_case() {
        assert_eq!(to_first_character_upper_case(""), "");
        assert_eq!(to_first_character_upper_case("a"), "A");
        assert_eq!(to_first_character_upper_case("users"), "Users");
        assert_eq!(to_first_character_upper_case("Users"), "Users");
        assert_eq!(to_first_character_upper_case("éclair"), "Éclair");
    }

    #[test]
    fn test_to_first_character_lower_case() {
        assert_eq!(to_first_character_lower_case(""), "");
        assert_eq!(to_first_character_lower_case("StringOrNumber"), "stringOrNumber");
        assert_eq!(to_first_character_lower_case("already"), "already");
    }
}
