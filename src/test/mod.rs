use std::{collections::BTreeSet, sync::Arc};

use crate::{
    inheritance::{AccessFlags, ClassInfo, MemoryInheritanceProvider},
    model::{ClassMapping, Mapping, MappingSet},
    signatures::{FieldSignature, MethodSignature},
};

// Helper function to create the mappings most unit tests start from:
//   ght         -> uk/jamierocks/Test
//   ght$ds      -> uk/jamierocks/Test$Example
//   ght$ds$bbc  -> uk/jamierocks/Test$Example$Inner
pub fn sample_mappings() -> Arc<MappingSet> {
    let mappings = MappingSet::new();

    let test = mappings.create_top_level_class_mapping("ght", "uk/jamierocks/Test");
    test.create_field_mapping(FieldSignature::untyped("rft"), "log");
    test.create_field_mapping(FieldSignature::of("hhy", "Lght;").unwrap(), "instance");

    let method = test.create_method_mapping(
        MethodSignature::of("hyuu", "(Lght$ds;)V").unwrap(),
        "helloWorld",
    );
    method.create_parameter_mapping(0, "example");

    let example = test.create_inner_class_mapping("ds", "Example");
    example.create_inner_class_mapping("bbc", "Inner");

    mappings
}

// Helper function to create a class info with public members
pub fn create_class_info(
    name: &str,
    super_name: Option<&str>,
    fields: &[&str],
    methods: &[&str],
) -> ClassInfo {
    let mut builder = ClassInfo::builder(name);
    if let Some(super_name) = super_name {
        builder = builder.super_class(super_name);
    }
    for field in fields {
        builder = builder.field(FieldSignature::untyped(*field), AccessFlags::PUBLIC);
    }
    for method in methods {
        builder = builder.method(MethodSignature::parse(method).unwrap(), AccessFlags::PUBLIC);
    }
    builder.build()
}

// Helper function to create a provider from a list of class infos
pub fn create_provider(classes: Vec<ClassInfo>) -> MemoryInheritanceProvider {
    let provider = MemoryInheritanceProvider::new();
    for class in classes {
        provider.register(class);
    }
    provider
}

// Every (full obfuscated, full deobfuscated) name pair in a set, members and parameters
// included, as an order-independent snapshot
pub fn mapping_pairs(mappings: &MappingSet) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    for class in mappings.top_level_class_mappings() {
        collect_class_pairs(&class, &mut pairs);
    }
    pairs
}

fn collect_class_pairs(class: &ClassMapping, pairs: &mut BTreeSet<(String, String)>) {
    pairs.insert((class.full_obfuscated_name(), class.full_deobfuscated_name()));
    for field in class.field_mappings() {
        pairs.insert((
            format!("{}:{}", class.full_obfuscated_name(), field.signature()),
            field.deobfuscated_name(),
        ));
    }
    for method in class.method_mappings() {
        let key = format!("{}:{}", class.full_obfuscated_name(), method.signature());
        pairs.insert((key.clone(), method.deobfuscated_name()));
        for param in method.parameter_mappings() {
            pairs.insert((format!("{key}#{}", param.index()), param.deobfuscated_name()));
        }
    }
    for inner in class.inner_class_mappings() {
        collect_class_pairs(&inner, pairs);
    }
}
