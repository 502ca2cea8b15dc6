use crate::metadata::{marshalling::MarshalSpec, token::Token};

/// Marshaling information of a field or parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarshal {
    /// The `Field` or `Param` being marshaled
    pub parent: Token,
    /// Decoded native type descriptor
    pub native_type: MarshalSpec,
}
