//! Identifier and descriptor model for JVM members.
//!
//! This module provides the immutable keys that identify members inside a class mapping,
//! together with the descriptor type grammar they are built from.
//!
//! # Key Components
//!
//! - [`FieldSignature`] - A field name plus an optional [`FieldType`]
//! - [`MethodSignature`] - A method name plus its [`MethodDescriptor`]
//! - [`FieldType`], [`Type`], [`MethodDescriptor`] - The descriptor type grammar
//! - [`DescriptorParser`] - Parser for descriptor text
//!
//! # Examples
//!
//! ```rust
//! use mapscope::signatures::{FieldSignature, MethodSignature};
//!
//! let field = FieldSignature::of("rft", "Ljava/util/logging/Logger;")?;
//! assert_eq!(field.name(), "rft");
//!
//! let method = MethodSignature::parse("helloWorld()V")?;
//! assert_eq!(method.name(), "helloWorld");
//! assert_eq!(method.descriptor().to_string(), "()V");
//! # Ok::<(), mapscope::Error>(())
//! ```

mod parser;
mod types;

use std::fmt;

pub use parser::DescriptorParser;
pub use types::{ArrayType, BaseType, FieldType, MethodDescriptor, ObjectType, Type};

use crate::Result;

/// Parse a complete field type descriptor, e.g. `[Ljava/lang/String;`
///
/// ## Arguments
/// * 'text' - The descriptor text
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the text is not exactly one field type.
pub fn parse_field_type(text: &str) -> Result<FieldType> {
    let mut parser = DescriptorParser::new(text);
    let field_type = parser.parse_field_type()?;
    parser.expect_end()?;
    Ok(field_type)
}

/// Parse a complete method descriptor, e.g. `(IJ)Ljava/lang/Object;`
///
/// ## Arguments
/// * 'text' - The descriptor text
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the text is not exactly one method descriptor.
pub fn parse_method_descriptor(text: &str) -> Result<MethodDescriptor> {
    let mut parser = DescriptorParser::new(text);
    let descriptor = parser.parse_method_descriptor()?;
    parser.expect_end()?;
    Ok(descriptor)
}

impl std::str::FromStr for FieldType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_field_type(s)
    }
}

impl std::str::FromStr for MethodDescriptor {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_method_descriptor(s)
    }
}

impl MethodDescriptor {
    /// Parse descriptor text, see [`parse_method_descriptor`]
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on invalid input.
    pub fn parse(text: &str) -> Result<Self> {
        parse_method_descriptor(text)
    }
}

/// The key of a field inside a class: its name and, if known, its type.
///
/// Many mapping formats do not record field types, so the type is optional. Two signatures
/// with the same name but differing presence of a type are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSignature {
    name: String,
    field_type: Option<FieldType>,
}

impl FieldSignature {
    /// Create a field signature
    pub fn new(name: impl Into<String>, field_type: Option<FieldType>) -> Self {
        FieldSignature {
            name: name.into(),
            field_type,
        }
    }

    /// Create a field signature without type information
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Create a field signature from a name and type descriptor text
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a field type.
    pub fn of(name: impl Into<String>, descriptor: &str) -> Result<Self> {
        Ok(Self::new(name, Some(parse_field_type(descriptor)?)))
    }

    /// The field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field type, if known
    #[must_use]
    pub fn field_type(&self) -> Option<&FieldType> {
        self.field_type.as_ref()
    }

    /// The same name without type information
    #[must_use]
    pub fn without_type(&self) -> FieldSignature {
        FieldSignature::untyped(self.name.clone())
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field_type {
            Some(field_type) => write!(f, "{}:{}", self.name, field_type),
            None => f.write_str(&self.name),
        }
    }
}

/// The key of a method inside a class: its name and descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    name: String,
    descriptor: MethodDescriptor,
}

impl MethodSignature {
    /// Create a method signature
    pub fn new(name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        MethodSignature {
            name: name.into(),
            descriptor,
        }
    }

    /// Create a method signature from a name and descriptor text
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a method descriptor.
    pub fn of(name: impl Into<String>, descriptor: &str) -> Result<Self> {
        Ok(Self::new(name, parse_method_descriptor(descriptor)?))
    }

    /// Parse a combined `name(params)return` string
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if there is no name, no `(` or the descriptor is invalid.
    pub fn parse(text: &str) -> Result<Self> {
        match text.find('(') {
            Some(index) if index > 0 => Self::of(&text[..index], &text[index..]),
            _ => Err(malformed_error!("Invalid method signature '{}'", text)),
        }
    }

    /// The method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method descriptor
    #[must_use]
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_signature_identity() {
        let typed = FieldSignature::of("rft", "Ljava/util/logging/Logger;").unwrap();
        let untyped = FieldSignature::untyped("rft");

        assert_ne!(typed, untyped);
        assert_eq!(typed.without_type(), untyped);
        assert_eq!(typed.to_string(), "rft:Ljava/util/logging/Logger;");
        assert_eq!(untyped.to_string(), "rft");
    }

    #[test]
    fn test_method_signature_parse() {
        let sig = MethodSignature::parse("a(ILbar/baz/D;)Lfoo/Bar;").unwrap();
        assert_eq!(sig.name(), "a");
        assert_eq!(sig.descriptor().params().len(), 2);
        assert_eq!(sig.to_string(), "a(ILbar/baz/D;)Lfoo/Bar;");
        assert_eq!(sig, MethodSignature::of("a", "(ILbar/baz/D;)Lfoo/Bar;").unwrap());
    }

    #[test]
    fn test_method_signature_parse_rejects_missing_parts() {
        assert!(MethodSignature::parse("()V").is_err());
        assert!(MethodSignature::parse("name").is_err());
        assert!(MethodSignature::parse("name(I").is_err());
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(parse_field_type("II").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
        assert!("I".parse::<FieldType>().is_ok());
        assert!("(J)Z".parse::<MethodDescriptor>().is_ok());
    }
}
