//! Type representations used inside JVM field and method descriptors.
//!
//! The grammar is the one from the class file format: a field type is either a primitive
//! ([`BaseType`]), a class reference ([`ObjectType`], written `Lname;`) or an array
//! ([`ArrayType`], written as one `[` per dimension followed by the component). Method return
//! types additionally allow `V` (void), represented by [`Type::Void`].
//!
//! All types compare structurally and can be used as hash keys. [`std::fmt::Display`] renders
//! the descriptor text, so `to_string()` and [`crate::signatures::DescriptorParser`] round-trip.

use std::fmt;

use strum::{EnumCount, EnumIter};

/// A primitive JVM type.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    /// The single character used for this type inside a descriptor
    #[must_use]
    pub fn descriptor(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// Resolve a descriptor character to its primitive type
    #[must_use]
    pub fn from_descriptor(c: char) -> Option<Self> {
        match c {
            'B' => Some(BaseType::Byte),
            'C' => Some(BaseType::Char),
            'D' => Some(BaseType::Double),
            'F' => Some(BaseType::Float),
            'I' => Some(BaseType::Int),
            'J' => Some(BaseType::Long),
            'S' => Some(BaseType::Short),
            'Z' => Some(BaseType::Boolean),
            _ => None,
        }
    }
}

/// A reference to a class, by its internal (`/`-separated) name.
///
/// Inner classes keep their binary `$` separator, e.g. `com/example/Outer$Inner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectType {
    class_name: String,
}

impl ObjectType {
    /// Create an object type, normalizing `.`-separated names to the internal form
    pub fn new(class_name: impl Into<String>) -> Self {
        ObjectType {
            class_name: class_name.into().replace('.', "/"),
        }
    }

    /// The internal name of the referenced class
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{};", self.class_name)
    }
}

/// An array type with one or more dimensions.
///
/// The component is never itself an array; nested arrays are flattened into the dimension
/// count on construction so `[[I` has two dimensions and an `int` component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayType {
    dimensions: usize,
    component: Box<FieldType>,
}

impl ArrayType {
    /// Create an array type of the given dimension count over `component`
    #[must_use]
    pub fn new(dimensions: usize, component: FieldType) -> Self {
        match component {
            FieldType::Array(inner) => ArrayType {
                dimensions: dimensions + inner.dimensions,
                component: inner.component,
            },
            other => ArrayType {
                dimensions,
                component: Box::new(other),
            },
        }
    }

    /// Number of array dimensions
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The element type once all dimensions are stripped
    #[must_use]
    pub fn component(&self) -> &FieldType {
        &self.component
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.dimensions {
            f.write_str("[")?;
        }
        write!(f, "{}", self.component)
    }
}

/// Any type a field can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    /// A primitive type
    Base(BaseType),
    /// A class reference
    Object(ObjectType),
    /// An array type
    Array(ArrayType),
}

impl FieldType {
    /// Shorthand for an [`ObjectType`] field type
    pub fn object(class_name: impl Into<String>) -> Self {
        FieldType::Object(ObjectType::new(class_name))
    }

    /// Returns `true` for class references and arrays
    #[must_use]
    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldType::Base(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.descriptor()),
            FieldType::Object(object) => write!(f, "{object}"),
            FieldType::Array(array) => write!(f, "{array}"),
        }
    }
}

impl From<BaseType> for FieldType {
    fn from(value: BaseType) -> Self {
        FieldType::Base(value)
    }
}

impl From<ObjectType> for FieldType {
    fn from(value: ObjectType) -> Self {
        FieldType::Object(value)
    }
}

impl From<ArrayType> for FieldType {
    fn from(value: ArrayType) -> Self {
        FieldType::Array(value)
    }
}

/// A value type as it appears in a method return position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// `V`
    Void,
    /// Any field type
    Field(FieldType),
}

impl Type {
    /// The field type, unless this is `void`
    #[must_use]
    pub fn as_field_type(&self) -> Option<&FieldType> {
        match self {
            Type::Void => None,
            Type::Field(field) => Some(field),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("V"),
            Type::Field(field) => write!(f, "{field}"),
        }
    }
}

impl From<FieldType> for Type {
    fn from(value: FieldType) -> Self {
        Type::Field(value)
    }
}

/// The parameter and return types of a method, e.g. `(ILjava/lang/String;)V`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodDescriptor {
    params: Vec<FieldType>,
    return_type: Type,
}

impl MethodDescriptor {
    /// Create a descriptor from its parts
    #[must_use]
    pub fn new(params: Vec<FieldType>, return_type: Type) -> Self {
        MethodDescriptor {
            params,
            return_type,
        }
    }

    /// Parameter types, in declaration order
    #[must_use]
    pub fn params(&self) -> &[FieldType] {
        &self.params
    }

    /// The return type
    #[must_use]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.return_type)
    }
}
