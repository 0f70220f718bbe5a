//! Casing helpers for identifiers derived from configuration keys.

/// Convert a key to start case with the spaces removed.
///
/// Words are split on non-alphanumeric characters and lower-to-upper case
/// boundaries, each word is capitalized, and the words are joined.
///
/// # Examples
///
/// ```
/// use extpack::manifest::start_case;
///
/// assert_eq!(start_case("default"), "Default");
/// assert_eq!(start_case("wide-icon"), "WideIcon");
/// assert_eq!(start_case("smallIcon"), "SmallIcon");
/// ```
pub fn start_case(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in key.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.iter().map(|word| capitalize_key(word)).collect()
}

/// Uppercase the first character of a key, leaving the rest unchanged.
///
/// # Examples
///
/// ```
/// use extpack::manifest::capitalize_key;
///
/// assert_eq!(capitalize_key("learn"), "Learn");
/// assert_eq!(capitalize_key("getStarted"), "GetStarted");
/// assert_eq!(capitalize_key(""), "");
/// ```
pub fn capitalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
