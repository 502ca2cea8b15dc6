use std::sync::OnceLock;

use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{
            types::{RowData, TableId},
            ModuleTables,
        },
        token::Token,
    },
    Result,
};

/// The decoded content of one row of a modeled table.
///
/// Implementors describe how a row's column values turn into owned content ([`RowContent::fill`])
/// and which back-links the row registers on other objects once filled ([`RowContent::apply`]).
/// Cross-references are stored as [`Token`]s, so a fill step may reference rows that are allocated
/// but not filled yet.
pub trait RowContent: Sized + Send + Sync + 'static {
    /// The table this content is decoded from
    const TABLE: TableId;

    /// Back-links other rows may register on this object, set at most once each
    type Links: Default + Send + Sync;

    /// The table holding the placeholders of this kind
    fn table(tables: &ModuleTables) -> &MetadataTable<Self>;

    /// Decode the content of `row`
    ///
    /// # Errors
    /// Returns an error if a column holds a malformed value or refers to a row that does not exist
    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self>;

    /// Register back-links of the filled row `token` on the objects it refers to
    ///
    /// # Errors
    /// Returns an error if a link was already registered by another row
    fn apply(&self, _token: Token, _context: &LoaderContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// A token-addressed placeholder that is filled exactly once
pub struct MetadataObject<D: RowContent> {
    token: Token,
    content: OnceLock<D>,
    pub(crate) links: D::Links,
}

impl<D: RowContent> MetadataObject<D> {
    /// An unfilled placeholder for `token`
    #[must_use]
    pub fn new(token: Token) -> Self {
        MetadataObject {
            token,
            content: OnceLock::new(),
            links: D::Links::default(),
        }
    }

    /// The identity of this object
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// True once the fill step ran
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.content.get().is_some()
    }

    /// The decoded row content
    ///
    /// # Errors
    /// Returns [`crate::Error::UnresolvedReference`] if the placeholder has not been filled
    pub fn content(&self) -> Result<&D> {
        self.content.get().ok_or_else(|| {
            unresolved_error!(self.token, self.token, "Object has not been filled yet")
        })
    }

    pub(crate) fn set_content(&self, content: D) -> Result<()> {
        self.content
            .set(content)
            .map_err(|_| malformed_error!("Object {} was filled twice", self.token))
    }
}

impl<D: RowContent + std::fmt::Debug> std::fmt::Debug for MetadataObject<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataObject")
            .field("token", &self.token)
            .field("content", &self.content.get())
            .finish_non_exhaustive()
    }
}

/// The placeholders of all rows of one table, indexed by row number
pub struct MetadataTable<D: RowContent> {
    objects: Vec<MetadataObject<D>>,
}

impl<D: RowContent> MetadataTable<D> {
    /// Allocate `rows` unfilled placeholders
    #[must_use]
    pub fn allocate(rows: u32) -> Self {
        MetadataTable {
            objects: (1..=rows)
                .map(|rid| MetadataObject::new(Token::from_parts(D::TABLE, rid)))
                .collect(),
        }
    }

    /// The placeholder of 1-based row `rid`
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&MetadataObject<D>> {
        if rid == 0 {
            return None;
        }
        self.objects.get(rid as usize - 1)
    }

    /// The placeholder identified by `token`, if it belongs to this table
    #[must_use]
    pub fn by_token(&self, token: Token) -> Option<&MetadataObject<D>> {
        if token.table() != D::TABLE as u8 {
            return None;
        }
        self.get(token.row())
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Placeholders in row order
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataObject<D>> {
        self.objects.iter()
    }
}

impl<D: RowContent> Default for MetadataTable<D> {
    fn default() -> Self {
        MetadataTable {
            objects: Vec::new(),
        }
    }
}

impl<'t, D: RowContent> IntoIterator for &'t MetadataTable<D> {
    type Item = &'t MetadataObject<D>;
    type IntoIter = std::slice::Iter<'t, MetadataObject<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Set a back-link, failing if another row registered one before
pub(crate) fn register_link(
    cell: &OnceLock<Token>,
    value: Token,
    what: &str,
    target: Token,
) -> Result<()> {
    cell.set(value).map_err(|existing| {
        malformed_error!(
            "{} of {} is registered by both {} and {}",
            what,
            target,
            cell.get().copied().unwrap_or(existing),
            value
        )
    })
}
