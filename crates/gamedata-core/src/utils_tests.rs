use crate::utils::{strip_member_prefix, to_cpp_type_name, to_snake_case};

#[test]
fn snake_case_from_pascal() {
    assert_eq!(to_snake_case("FooBar"), "foo_bar");
    assert_eq!(to_snake_case("Foo"), "foo");
}

#[test]
fn snake_case_from_camel() {
    assert_eq!(to_snake_case("fooBar"), "foo_bar");
    assert_eq!(to_snake_case("fooBarBaz"), "foo_bar_baz");
}

#[test]
fn snake_case_keeps_existing_underscores() {
    assert_eq!(to_snake_case("Foo_Bar"), "foo_bar");
}

#[test]
fn cpp_type_name_suffix() {
    assert_eq!(to_cpp_type_name("Hero"), "hero_t");
    assert_eq!(to_cpp_type_name("LootTable"), "loot_table_t");
}

#[test]
fn cpp_type_name_drops_namespace() {
    assert_eq!(to_cpp_type_name("Game.Items.Sword"), "sword_t");
    assert_eq!(to_cpp_type_name("game::Shield"), "shield_t");
}

#[test]
fn strip_prefix() {
    assert_eq!(strip_member_prefix("m_health", "m_"), "health");
    assert_eq!(strip_member_prefix("health", "m_"), "health");
    assert_eq!(strip_member_prefix("m_", "m_"), "m_");
    assert_eq!(strip_member_prefix("m_health", ""), "m_health");
}
