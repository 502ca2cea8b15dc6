use crate::metadata::signatures::{SignatureLocalVariables, SignatureMethod};

/// A signature not attached to any member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandAloneSignature {
    /// Locals of a method body
    LocalVariables(SignatureLocalVariables),
    /// Signature of an indirect call site
    Method(SignatureMethod),
}

/// A row of the `StandAloneSig` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandAloneSig {
    /// The decoded signature
    pub signature: StandAloneSignature,
}
