//! Integration tests for inheritance completion and the remapper built on top of it.

use std::sync::Arc;

use mapscope::prelude::*;

fn hierarchy() -> Result<(Arc<MappingSet>, MemoryInheritanceProvider)> {
    let mappings = MappingSet::new();

    let base = mappings.create_top_level_class_mapping("pkg/a", "pkg/Base");
    base.create_field_mapping(FieldSignature::untyped("f"), "shared");
    base.create_field_mapping(FieldSignature::untyped("s"), "secret");
    base.create_method_mapping(MethodSignature::parse("get()Ljava/lang/Object;")?, "getValue");
    base.create_method_mapping(MethodSignature::parse("m()V")?, "packageOnly");

    mappings
        .create_top_level_class_mapping("pkg/i", "pkg/Runnable")
        .create_method_mapping(MethodSignature::parse("r()V")?, "run");

    let provider: MemoryInheritanceProvider = [
        ClassInfo::builder("pkg/a")
            .field(FieldSignature::untyped("f"), AccessFlags::PROTECTED)
            .field(FieldSignature::untyped("s"), AccessFlags::PRIVATE)
            .method(MethodSignature::parse("get()Ljava/lang/Object;")?, AccessFlags::PUBLIC)
            .method(MethodSignature::parse("m()V")?, AccessFlags::empty())
            .build(),
        ClassInfo::builder("pkg/i")
            .method(
                MethodSignature::parse("r()V")?,
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            )
            .build(),
        ClassInfo::builder("pkg/b")
            .super_class("pkg/a")
            .interface("pkg/i")
            .method(MethodSignature::parse("get()Lpkg/b;")?, AccessFlags::PUBLIC)
            .build(),
        ClassInfo::builder("other/c").super_class("pkg/a").build(),
    ]
    .into_iter()
    .collect();

    Ok((mappings, provider))
}

#[test]
fn test_completion_inherits_visible_members() -> Result<()> {
    let (mappings, provider) = hierarchy()?;
    let child = mappings.get_or_create_class_mapping("pkg/b");
    assert!(!child.is_completed());

    child.complete(&provider);
    assert!(child.is_completed());

    assert_eq!(child.get_field_mapping_by_name("f").unwrap().deobfuscated_name(), "shared");
    assert!(child.get_field_mapping_by_name("s").is_none());

    let inherited = child
        .get_method_mapping(&MethodSignature::parse("get()Ljava/lang/Object;")?)
        .unwrap();
    let covariant = child
        .get_method_mapping(&MethodSignature::parse("get()Lpkg/b;")?)
        .unwrap();
    assert!(Arc::ptr_eq(&inherited, &covariant));
    assert_eq!(covariant.deobfuscated_name(), "getValue");

    assert_eq!(
        child
            .get_method_mapping(&MethodSignature::parse("r()V")?)
            .unwrap()
            .deobfuscated_name(),
        "run"
    );
    assert_eq!(
        child
            .get_method_mapping(&MethodSignature::parse("m()V")?)
            .unwrap()
            .deobfuscated_name(),
        "packageOnly"
    );
    Ok(())
}

#[test]
fn test_package_private_members_stay_in_package() -> Result<()> {
    let (mappings, provider) = hierarchy()?;
    let outsider = mappings.get_or_create_class_mapping("other/c");
    outsider.complete(&provider);

    assert!(outsider
        .get_method_mapping(&MethodSignature::parse("m()V")?)
        .is_none());
    // protected members cross package boundaries
    assert!(outsider.get_field_mapping_by_name("f").is_some());
    Ok(())
}

#[test]
fn test_inherited_entries_share_renames() -> Result<()> {
    let (mappings, provider) = hierarchy()?;
    let child = mappings.get_or_create_class_mapping("pkg/b");
    child.complete(&provider);

    mappings
        .get_top_level_class_mapping("pkg/a")
        .unwrap()
        .get_field_mapping_by_name("f")
        .unwrap()
        .set_deobfuscated_name("renamed");
    assert_eq!(child.get_field_mapping_by_name("f").unwrap().deobfuscated_name(), "renamed");
    Ok(())
}

#[test]
fn test_unknown_class_is_left_alone() {
    let mappings = MappingSet::new();
    let provider = MemoryInheritanceProvider::new();
    let class = mappings.get_or_create_class_mapping("nowhere/X");

    class.complete(&provider);
    assert!(!class.is_completed());
    assert!(class.field_mappings().is_empty());
}

#[test]
fn test_remapper_resolves_through_subclasses() -> Result<()> {
    let (mappings, provider) = hierarchy()?;
    let provider = CachingInheritanceProvider::new(provider);
    let remapper = Remapper::new(&*mappings, &provider);

    assert_eq!(remapper.map_class("pkg/a"), "pkg/Base");
    assert_eq!(remapper.map_class("pkg/b"), "pkg/b");
    assert_eq!(remapper.map_field_name("pkg/b", "f", "I")?, "shared");
    assert_eq!(remapper.map_method_name("pkg/b", "get", "()Lpkg/b;")?, "getValue");
    assert_eq!(remapper.map_method_name("pkg/b", "r", "()V")?, "run");
    assert_eq!(remapper.map_method_name("other/c", "m", "()V")?, "m");
    assert_eq!(
        remapper.map_descriptor("(Lpkg/a;Lpkg/i;)Lpkg/b;")?,
        "(Lpkg/Base;Lpkg/Runnable;)Lpkg/b;"
    );
    Ok(())
}

#[test]
fn test_assignability_rules() -> Result<()> {
    let (_, provider) = hierarchy()?;
    let object = Type::Field(FieldType::object("java/lang/Object"));
    let base = Type::Field(FieldType::object("pkg/a"));
    let child = Type::Field(FieldType::object("pkg/b"));
    let ints = Type::Field(FieldType::Array(ArrayType::new(
        2,
        FieldType::Base(BaseType::Int),
    )));

    assert!(provider.is_assignable_from(&base, &child));
    assert!(!provider.is_assignable_from(&child, &base));
    assert!(provider.is_assignable_from(&object, &ints));
    assert!(!provider.is_assignable_from(&Type::Void, &base));
    assert!(provider.is_subclass_of("pkg/b", "pkg/i"));
    Ok(())
}
