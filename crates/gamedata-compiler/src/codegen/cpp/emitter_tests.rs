use std::sync::Arc;

use super::{CodegenError, Config, emit};
use crate::config;
use crate::meta::MetaCode;
use crate::reflect::{DataUnit, Object, Reflector, Ty, Value};
use crate::test_utils::{Blob, Vec3, color, hero, hero_unit};

fn solve(unit: &DataUnit) -> MetaCode {
    let mut code = MetaCode::new();
    Reflector::new(&config::Config::new())
        .analyze(unit, &mut code)
        .unwrap();
    code.solve_layout();
    code
}

fn emit_root(root: Object, config: &Config) -> Result<String, CodegenError> {
    emit(&solve(&DataUnit::new("Test/Root", root)), config)
}

fn bare() -> Config {
    Config::new().pragma_once(false)
}

#[test]
fn emit_empty_model() {
    let output = emit(&MetaCode::new(), &Config::new()).unwrap();
    assert_eq!(output, "#pragma once\n");
}

#[test]
fn emit_hero() {
    let output = emit(&solve(&hero_unit()), &Config::new()).unwrap();

    insta::assert_snapshot!(output, @r"
    #pragma once

    // Forward declarations
    struct hero_t;

    struct hero_t
    {
        inline string_t const& getname() const { return m_name; }
        inline array_t<s32> const& getstats() const { return m_stats; }
        inline bool getflagA() const { return (m_flagA & (1u << 0)) != 0; }
        inline bool getflagB() const { return (m_flagA & (1u << 1)) != 0; }
        inline s32 getcount() const { return m_count; }

    private:
        string_t m_name;
        array_t<s32> m_stats;
        u32 m_flagA;
        s32 m_count;
    };
    ");
}

#[test]
fn emit_enums_structs_and_classes() {
    let armory = Object::new("Game.Armory")
        .with("m_tint", Ty::Enum(color()), Value::Enum(color(), 2))
        .with("m_trim", Ty::Enum(color()), Value::Enum(color(), 0))
        .with(
            "m_origin",
            Ty::Opaque("vec3_t".into()),
            Arc::new(Vec3::new(1.0, 2.0, 3.0)),
        )
        .with("m_owner", Ty::class("Game.Hero"), hero())
        .with(
            "m_prices",
            Ty::dictionary(Ty::String, Ty::Int32),
            Value::Dictionary(vec![(Value::from("sword"), Value::from(10))]),
        );

    let output = emit_root(armory, &Config::new().namespace("game")).unwrap();

    insta::assert_snapshot!(output, @r"
    #pragma once

    namespace game
    {

    namespace enums
    {
        enum Color
        {
            Red = 0,
            Green = 1,
            Blue = 2,
        };
    }

    // Forward declarations
    struct armory_t;
    struct hero_t;

    struct hero_t
    {
        inline string_t const& getname() const { return m_name; }
        inline array_t<s32> const& getstats() const { return m_stats; }
        inline bool getflagA() const { return (m_flagA & (1u << 0)) != 0; }
        inline bool getflagB() const { return (m_flagA & (1u << 1)) != 0; }
        inline s32 getcount() const { return m_count; }

    private:
        string_t m_name;
        array_t<s32> m_stats;
        u32 m_flagA;
        s32 m_count;
    };

    struct vec3_t
    {
        f32 x, y, z;
    };

    struct armory_t
    {
        inline hero_t const* getowner() const { return m_owner; }
        inline dict_t<string_t, s32> const& getprices() const { return m_prices; }
        inline vec3_t const& getorigin() const { return m_origin; }
        inline enums::Color gettint() const { return (enums::Color)m_tint; }
        inline enums::Color gettrim() const { return (enums::Color)m_trim; }

    private:
        hero_t* m_owner;
        dict_t<string_t, s32> m_prices;
        vec3_t m_origin;
        u8 m_tint;
        u8 m_trim;
    };

    } // namespace game
    ");
}

#[test]
fn emit_collections_of_classes_and_data_units() {
    let enemy = |hp: i16| Value::Object(Object::new("Enemy").with("m_hp", Ty::Int16, hp));
    let track = DataUnit::new(
        "Audio/Theme",
        Object::new("Audio.Track").with("m_volume", Ty::Float, 0.5f32),
    );
    let level = Object::new("Level")
        .with(
            "m_enemies",
            Ty::list(Ty::class("Enemy")),
            vec![enemy(10), enemy(20)],
        )
        .with("m_music", Ty::DataUnit("Audio.Track".into()), track);

    let output = emit_root(level, &bare()).unwrap();

    insta::assert_snapshot!(output, @r"
    // Forward declarations
    struct level_t;
    struct track_t;
    struct enemy_t;

    struct level_t
    {
        inline array_t<enemy_t*> const& getenemies() const { return m_enemies; }
        inline dataunit_t<track_t> const& getmusic() const { return m_music; }

    private:
        array_t<enemy_t*> m_enemies;
        dataunit_t<track_t> m_music;
    };

    struct enemy_t
    {
        inline s16 gethp() const { return m_hp; }

    private:
        s16 m_hp;
    };

    struct track_t
    {
        inline f32 getvolume() const { return m_volume; }

    private:
        f32 m_volume;
    };
    ");
}

#[test]
fn empty_collections_keep_element_types() {
    let bag = Object::new("Bag")
        .with("m_points", Ty::list(Ty::Opaque("vec3_t".into())), Vec::<Value>::new())
        .with(
            "m_tags",
            Ty::dictionary(Ty::String, Ty::Enum(color())),
            Value::Dictionary(Vec::new()),
        );

    let output = emit_root(bag, &bare()).unwrap();

    insta::assert_snapshot!(output, @r"
    namespace enums
    {
        enum Color
        {
            Red = 0,
            Green = 1,
            Blue = 2,
        };
    }

    // Forward declarations
    struct bag_t;

    struct bag_t
    {
        inline array_t<vec3_t> const& getpoints() const { return m_points; }
        inline dict_t<string_t, u8> const& gettags() const { return m_tags; }

    private:
        array_t<vec3_t> m_points;
        dict_t<string_t, u8> m_tags;
    };
    ");
}

#[test]
fn structs_follow_their_dependencies() {
    let rig = Object::new("Rig")
        .with(
            "m_joint",
            Ty::Opaque("joint_t".into()),
            Arc::new(Blob::new("joint_t", 8, 4).uses("bone_t")),
        )
        .with(
            "m_bone",
            Ty::Opaque("bone_t".into()),
            Arc::new(Blob::new("bone_t", 4, 4)),
        );

    let output = emit_root(rig, &bare().forward_declarations(false)).unwrap();

    insta::assert_snapshot!(output, @r"
    struct bone_t
    {
    };

    struct joint_t
    {
        bone_t part0;
    };

    struct rig_t
    {
        inline bone_t const& getbone() const { return m_bone; }
        inline joint_t const& getjoint() const { return m_joint; }

    private:
        bone_t m_bone;
        joint_t m_joint;
    };
    ");
}

#[test]
fn struct_cycle_is_an_error() {
    let rig = Object::new("Rig")
        .with(
            "m_a",
            Ty::Opaque("a_t".into()),
            Arc::new(Blob::new("a_t", 4, 4).uses("b_t")),
        )
        .with(
            "m_b",
            Ty::Opaque("b_t".into()),
            Arc::new(Blob::new("b_t", 4, 4).uses("a_t")),
        );

    let err = emit_root(rig, &bare()).unwrap_err();

    assert!(matches!(err, CodegenError::DependencyCycle { .. }));
    assert_eq!(
        err.to_string(),
        "no valid ordering exists for types: rig_t, a_t, b_t"
    );
}

fn mutual() -> Object {
    let b = Object::new("B").with("m_a", Ty::class("A"), Value::Null);
    Object::new("A").with("m_b", Ty::class("B"), b)
}

#[test]
fn forward_declarations_allow_mutual_pointers() {
    let output = emit_root(mutual(), &bare()).unwrap();

    insta::assert_snapshot!(output, @r"
    // Forward declarations
    struct a_t;
    struct b_t;

    struct a_t
    {
        inline b_t const* getb() const { return m_b; }

    private:
        b_t* m_b;
    };

    struct b_t
    {
        inline a_t const* geta() const { return m_a; }

    private:
        a_t* m_a;
    };
    ");
}

#[test]
fn mutual_pointers_without_forward_declarations_fail() {
    let err = emit_root(mutual(), &bare().forward_declarations(false)).unwrap_err();

    assert_eq!(
        err.to_string(),
        "no valid ordering exists for types: a_t, b_t"
    );
}

#[test]
fn pointed_to_classes_come_first_without_forward_declarations() {
    let root = Object::new("Zone").with("m_boss", Ty::class("Game.Hero"), hero());

    let output = emit_root(root, &bare().forward_declarations(false)).unwrap();

    let hero_at = output.find("struct hero_t").unwrap();
    let zone_at = output.find("struct zone_t").unwrap();
    assert!(hero_at < zone_at);
    assert!(!output.contains("// Forward declarations"));
}

fn zoo() -> Object {
    let cat = Object::new("Cat").with("lives", Ty::Int32, 9);
    let dog = Object::new("Dog").with("bark", Ty::Float, 1.5f32);
    Object::new("Zoo").with(
        "animals",
        Ty::list(Ty::class("Animal")),
        vec![Value::from(cat), Value::from(dog)],
    )
}

#[test]
fn polymorphic_arrays_point_at_their_base() {
    let output = emit_root(zoo(), &bare()).unwrap();

    insta::assert_snapshot!(output, @r"
    // Forward declarations
    struct zoo_t;
    struct animal_t;
    struct cat_t;
    struct dog_t;

    struct zoo_t
    {
        inline array_t<animal_t*> const& getanimals() const { return m_animals; }

    private:
        array_t<animal_t*> m_animals;
    };

    struct cat_t
    {
        inline s32 getlives() const { return m_lives; }

    private:
        s32 m_lives;
    };

    struct dog_t
    {
        inline f32 getbark() const { return m_bark; }

    private:
        f32 m_bark;
    };
    ");
}

#[test]
fn polymorphic_bases_are_declared_without_forward_declarations() {
    let output = emit_root(zoo(), &bare().forward_declarations(false)).unwrap();

    assert!(output.starts_with("// Forward declarations\nstruct animal_t;\n\nstruct cat_t\n"));
    assert!(!output.contains("struct zoo_t;"));
    assert!(output.contains("array_t<animal_t*> m_animals;"));
}

#[test]
fn polymorphic_dictionary_values_point_at_their_base() {
    let kennel = Object::new("Kennel").with(
        "pets",
        Ty::dictionary(Ty::String, Ty::class("Animal")),
        Value::Dictionary(vec![
            (Value::from("rex"), Value::from(Object::new("Dog"))),
            (Value::from("tom"), Value::from(Object::new("Cat"))),
        ]),
    );

    let output = emit_root(kennel, &bare()).unwrap();

    assert!(output.contains("    dict_t<string_t, animal_t*> m_pets;\n"));
    assert!(output.contains("struct animal_t;\n"));
}
