use std::fmt;

/// A reference to another assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRef {
    /// Major version
    pub major_version: u32,
    /// Minor version
    pub minor_version: u32,
    /// Build number
    pub build_number: u32,
    /// Revision number
    pub revision_number: u32,
    /// `AssemblyFlags` bitmask
    pub flags: u32,
    /// Full public key if `flags` has `PublicKey` set, else its 8-byte token
    pub public_key_or_token: Vec<u8>,
    /// Simple name of the assembly
    pub name: String,
    /// Culture, empty for neutral
    pub culture: String,
    /// Hash of the referenced assembly, usually empty
    pub hash_value: Vec<u8>,
}

impl fmt::Display for AssemblyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Version={}.{}.{}.{}",
            self.name,
            self.major_version,
            self.minor_version,
            self.build_number,
            self.revision_number
        )?;
        if !self.culture.is_empty() {
            write!(f, ", Culture={}", self.culture)?;
        }
        Ok(())
    }
}
