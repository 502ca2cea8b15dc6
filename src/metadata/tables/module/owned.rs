/// The single row of the `Module` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Reserved, shall be zero
    pub generation: u32,
    /// Name of the module
    pub name: String,
    /// Distinguishes two versions of the same module
    pub mvid: Option<uguid::Guid>,
    /// Edit-and-continue id
    pub enc_id: Option<uguid::Guid>,
    /// Edit-and-continue base id
    pub enc_base_id: Option<uguid::Guid>,
}
