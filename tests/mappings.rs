//! Integration tests for building, querying, reversing and copying mapping sets.

use std::{
    sync::{Arc, Mutex},
    thread,
};

use mapscope::prelude::*;

fn sample() -> Result<Arc<MappingSet>> {
    let mappings = MappingSet::new();
    let test = mappings.create_top_level_class_mapping("ght", "uk/jamierocks/Test");
    test.create_field_mapping(FieldSignature::of("rft", "Lght$ds;")?, "example");
    test.create_method_mapping(MethodSignature::parse("hyuu(Lght$ds;I)Lght;")?, "helloWorld")
        .create_parameter_mapping(0, "value");
    let inner = test.create_inner_class_mapping("ds", "Example");
    inner.create_field_mapping(FieldSignature::untyped("a"), "name");
    test.add_javadoc("The main test class");
    Ok(mappings)
}

#[test]
fn test_deobfuscate_descriptors() -> Result<()> {
    let mappings = sample()?;

    let descriptor = MethodDescriptor::parse("(Lght;[[Lght$ds;Lght$zz;Lother;D)[Lght;")?;
    assert_eq!(
        mappings.deobfuscate_descriptor(&descriptor).to_string(),
        "(Luk/jamierocks/Test;[[Luk/jamierocks/Test$Example;Luk/jamierocks/Test$zz;Lother;D)[Luk/jamierocks/Test;"
    );

    let signature = FieldSignature::of("x", "Lght$ds;")?;
    assert_eq!(
        mappings.deobfuscate_field_signature(&signature).to_string(),
        FieldSignature::of("x", "Luk/jamierocks/Test$Example;")?.to_string()
    );
    Ok(())
}

#[test]
fn test_lookup_by_full_name() -> Result<()> {
    let mappings = sample()?;

    let inner = mappings.get_class_mapping("ght$ds").unwrap();
    assert!(inner.is_inner());
    assert_eq!(inner.full_deobfuscated_name(), "uk/jamierocks/Test$Example");
    assert_eq!(inner.deobfuscated_package_name(), "uk/jamierocks");
    assert_eq!(
        inner.parent_class().unwrap().obfuscated_name(),
        mappings.get_top_level_class_mapping("ght").unwrap().obfuscated_name()
    );

    assert!(mappings.get_class_mapping("ght$missing").is_none());
    assert!(mappings.get_class_mapping("missing$ds").is_none());

    let created = mappings.get_or_create_class_mapping("new/Outer$a$b");
    assert_eq!(created.full_obfuscated_name(), "new/Outer$a$b");
    assert!(!created.has_deobfuscated_name());
    assert!(mappings.has_top_level_class_mapping("new/Outer"));
    Ok(())
}

#[test]
fn test_dotted_names_are_normalized() {
    let mappings = MappingSet::new();
    let class = mappings.create_top_level_class_mapping("a.b.C", "com.example.Foo");
    assert_eq!(class.obfuscated_name(), "a/b/C");
    assert_eq!(class.deobfuscated_name(), "com/example/Foo");
    assert_eq!(class.simple_deobfuscated_name(), "Foo");
    assert!(mappings.get_top_level_class_mapping("a/b/C").is_some());
}

#[test]
fn test_reverse_swaps_namespaces() -> Result<()> {
    let mappings = sample()?;
    let reversed = mappings.reverse();

    let test = reversed.get_top_level_class_mapping("uk/jamierocks/Test").unwrap();
    assert_eq!(test.deobfuscated_name(), "ght");
    assert_eq!(test.javadoc(), vec!["The main test class".to_string()]);

    let field = test
        .get_field_mapping(&FieldSignature::of(
            "example",
            "Luk/jamierocks/Test$Example;",
        )?)
        .unwrap();
    assert_eq!(field.deobfuscated_name(), "rft");

    let method = test
        .get_method_mapping(&MethodSignature::parse(
            "helloWorld(Luk/jamierocks/Test$Example;I)Luk/jamierocks/Test;",
        )?)
        .unwrap();
    assert_eq!(method.deobfuscated_name(), "hyuu");
    assert_eq!(method.get_parameter_mapping(0).unwrap().deobfuscated_name(), "value");

    let inner = reversed.get_class_mapping("uk/jamierocks/Test$Example").unwrap();
    assert_eq!(inner.full_deobfuscated_name(), "ght$ds");
    Ok(())
}

#[test]
fn test_reverse_twice_restores_the_set() -> Result<()> {
    let mappings = sample()?;
    assert_eq!(*mappings.reverse().reverse(), *mappings);
    Ok(())
}

#[test]
fn test_copy_is_independent() -> Result<()> {
    let mappings = sample()?;
    let copy = mappings.copy();
    assert_eq!(*copy, *mappings);

    copy.get_top_level_class_mapping("ght")
        .unwrap()
        .set_deobfuscated_name("uk/jamierocks/Renamed");
    assert_ne!(*copy, *mappings);
    assert_eq!(
        mappings.get_top_level_class_mapping("ght").unwrap().deobfuscated_name(),
        "uk/jamierocks/Test"
    );
    Ok(())
}

#[test]
fn test_rename_listeners() {
    let mappings = MappingSet::new();
    let class = mappings.create_top_level_class_mapping("a", "First");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = seen.clone();
    let id = class.add_listener(move |mapping: &ClassMapping, new_name: &str| {
        recorder
            .lock()
            .unwrap()
            .push(format!("{} -> {}", mapping.deobfuscated_name(), new_name));
    });

    class.set_deobfuscated_name("Second");
    class.set_deobfuscated_name("Second");
    assert!(class.remove_listener(id));
    class.set_deobfuscated_name("Third");

    assert_eq!(*seen.lock().unwrap(), vec!["First -> Second".to_string()]);
    assert_eq!(class.deobfuscated_name(), "Third");
}

#[test]
fn test_concurrent_creation_yields_one_mapping() {
    let mappings = MappingSet::new();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let mappings = mappings.clone();
            thread::spawn(move || {
                for index in 0..100 {
                    let class = mappings.get_or_create_class_mapping(&format!("c{index}$inner"));
                    class.get_or_create_field_mapping_by_name(&format!("f{worker}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(mappings.len(), 100);
    for index in 0..100 {
        let class = mappings.get_class_mapping(&format!("c{index}$inner")).unwrap();
        assert_eq!(class.field_mappings().len(), 8);
    }
}

#[test]
fn test_malformed_descriptors_are_rejected() {
    assert!(matches!(
        MethodSignature::parse("m(I"),
        Err(Error::Malformed { .. })
    ));
    assert!(matches!(
        FieldSignature::of("f", "Ljava/lang/String"),
        Err(Error::Malformed { .. })
    ));
    assert!(MethodDescriptor::parse("()VV").is_err());
}
