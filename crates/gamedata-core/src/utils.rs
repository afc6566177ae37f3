/// Convert PascalCase or camelCase to snake_case.
///
/// # Examples
/// ```
/// use gamedata_core::utils::to_snake_case;
/// assert_eq!(to_snake_case("HeroData"), "hero_data");
/// assert_eq!(to_snake_case("heroData"), "hero_data");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// C++ type name for a reflected class: snake case with a `_t` suffix.
///
/// Namespace qualifiers (`Game.Hero`, `Game::Hero`) are dropped.
///
/// # Examples
/// ```
/// use gamedata_core::utils::to_cpp_type_name;
/// assert_eq!(to_cpp_type_name("HeroData"), "hero_data_t");
/// assert_eq!(to_cpp_type_name("Game.Weapon"), "weapon_t");
/// ```
pub fn to_cpp_type_name(s: &str) -> String {
    let base = s.rsplit(['.', ':']).next().unwrap_or(s);
    let mut name = to_snake_case(base);
    name.push_str("_t");
    name
}

/// Strip a field-name prefix such as `m_`.
///
/// The name is returned unchanged if stripping would leave it empty.
pub fn strip_member_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    match name.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && !rest.is_empty() => rest,
        _ => name,
    }
}
