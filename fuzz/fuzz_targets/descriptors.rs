#![no_main]

use libfuzzer_sys::fuzz_target;
use mapscope::{model::MappingSet, signatures::MethodSignature};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(signature) = MethodSignature::parse(text) {
        let mappings = MappingSet::new();
        let _ = mappings.deobfuscate_method_signature(&signature);
    }
});
