use crate::{
    signatures::{ArrayType, BaseType, FieldType, MethodDescriptor, ObjectType, Type},
    Result,
};

/// Maximum number of array dimensions permitted by the class file format
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Descriptor parser for the JVM field and method descriptor grammar
///
/// # Example
///
/// ```rust
/// use mapscope::signatures::DescriptorParser;
/// let mut parser = DescriptorParser::new("(I[Ljava/lang/String;)V");
/// let desc = parser.parse_method_descriptor().unwrap();
/// assert_eq!(desc.params().len(), 2);
/// ```
///
/// ## Notes:
/// - The wrapper functions [`crate::signatures::parse_field_type`] and
///   [`crate::signatures::parse_method_descriptor`] additionally reject trailing input.
/// - Class names are accepted in either `/` or `.` form and are stored in `/` form.
pub struct DescriptorParser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    /// Create a new `DescriptorParser` over descriptor text
    ///
    /// ## Arguments
    /// * 'source' - The descriptor text to read from
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        DescriptorParser { source, pos: 0 }
    }

    /// Returns `true` if there is unread input left
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.pos < self.source.len()
    }

    /// Current byte offset into the source
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Result<char> {
        match self.peek() {
            Some(c) => {
                self.pos += c.len_utf8();
                Ok(c)
            }
            None => Err(malformed_error!(
                "Unexpected end of descriptor '{}'",
                self.source
            )),
        }
    }

    /// Parse a single field type
    pub fn parse_field_type(&mut self) -> Result<FieldType> {
        let start = self.pos;
        let current = self.next_char()?;
        match current {
            'L' => {
                let rest = &self.source[self.pos..];
                let Some(end) = rest.find(';') else {
                    return Err(malformed_error!(
                        "Unterminated class reference at offset {} in '{}'",
                        start,
                        self.source
                    ));
                };
                if end == 0 {
                    return Err(malformed_error!(
                        "Empty class name at offset {} in '{}'",
                        start,
                        self.source
                    ));
                }

                let name = &rest[..end];
                self.pos += end + 1;
                Ok(FieldType::Object(ObjectType::new(name)))
            }
            '[' => {
                let mut dimensions = 1;
                while self.peek() == Some('[') {
                    self.pos += 1;
                    dimensions += 1;
                }
                if dimensions > MAX_ARRAY_DIMENSIONS {
                    return Err(malformed_error!(
                        "Array type exceeds {} dimensions in '{}'",
                        MAX_ARRAY_DIMENSIONS,
                        self.source
                    ));
                }

                let component = self.parse_field_type()?;
                Ok(FieldType::Array(ArrayType::new(dimensions, component)))
            }
            other => BaseType::from_descriptor(other)
                .map(FieldType::Base)
                .ok_or_else(|| {
                    malformed_error!(
                        "Unsupported type character '{}' at offset {} in '{}'",
                        other,
                        start,
                        self.source
                    )
                }),
        }
    }

    /// Parse a return type, which is a field type or `V`
    pub fn parse_type(&mut self) -> Result<Type> {
        if self.peek() == Some('V') {
            self.pos += 1;
            return Ok(Type::Void);
        }

        Ok(Type::Field(self.parse_field_type()?))
    }

    /// Parse a method descriptor, `(params)return`
    pub fn parse_method_descriptor(&mut self) -> Result<MethodDescriptor> {
        if self.next_char()? != '(' {
            return Err(malformed_error!(
                "Method descriptor must start with '(' - '{}'",
                self.source
            ));
        }

        let mut params = Vec::new();
        loop {
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => params.push(self.parse_field_type()?),
                None => {
                    return Err(malformed_error!(
                        "Unterminated parameter list in '{}'",
                        self.source
                    ))
                }
            }
        }

        let return_type = self.parse_type()?;
        Ok(MethodDescriptor::new(params, return_type))
    }

    /// Fail if any input is left unread
    pub fn expect_end(&self) -> Result<()> {
        if self.has_more_data() {
            return Err(malformed_error!(
                "Trailing data at offset {} in '{}'",
                self.pos,
                self.source
            ));
        }
        Ok(())
    }
}
