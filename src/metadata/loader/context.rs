//! Shared state handed to every fill and apply step of a module import.

use std::ops::Range;

use crate::{
    config::ImportOptions,
    file::parser::Parser,
    metadata::{
        diagnostics::Diagnostics,
        signatures::{ParseFlags, Signature, SignatureParser},
        streams::{Blob, Guid, Strings, TablesHeader},
        tables::{CodedIndexType, MetadataObject, ModuleTables, RowContent, RowData, TableId},
        token::Token,
    },
    Result,
};

/// Heaps, tables and options of the module being imported
pub(crate) struct LoaderContext<'a> {
    pub header: &'a TablesHeader<'a>,
    pub strings: Strings<'a>,
    pub blobs: Blob<'a>,
    pub guids: Guid<'a>,
    pub tables: &'a ModuleTables,
    pub options: &'a ImportOptions,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> LoaderContext<'a> {
    /// Row count of `table`
    pub fn rows(&self, table: TableId) -> u32 {
        self.header.info.rows(table)
    }

    /// Owned copy of the `#Strings` entry at `index`
    pub fn string(&self, index: u32) -> Result<String> {
        Ok(self.strings.get(index as usize)?.to_string())
    }

    /// The `#Blob` entry at `index`
    pub fn blob(&self, index: u32) -> Result<&'a [u8]> {
        self.blobs.get(index as usize)
    }

    /// The `#GUID` entry at `index`
    pub fn guid(&self, index: u32) -> Result<Option<uguid::Guid>> {
        self.guids.get(index as usize)
    }

    /// The placeholder of row `rid` of `D`'s table
    pub fn get<D: RowContent>(&self, rid: u32) -> Option<&'a MetadataObject<D>> {
        D::table(self.tables).get(rid)
    }

    /// The placeholder `token` refers to, as seen from `referrer`
    pub fn object<D: RowContent>(
        &self,
        token: Token,
        referrer: Token,
    ) -> Result<&'a MetadataObject<D>> {
        D::table(self.tables)
            .by_token(token)
            .ok_or_else(|| {
                unresolved_error!(token, referrer, "No {} row {}", D::TABLE, token.row())
            })
    }

    /// Resolve a simple row index of `D`'s table
    ///
    /// Row 0 and rows past the end are unresolved references from `referrer`.
    pub fn resolve<D: RowContent>(&self, rid: u32, referrer: Token) -> Result<Token> {
        let target = Token::from_parts(D::TABLE, rid);
        match self.get::<D>(rid) {
            Some(object) => Ok(object.token()),
            None => Err(unresolved_error!(
                target,
                referrer,
                "{} has {} rows",
                D::TABLE,
                self.rows(D::TABLE)
            )),
        }
    }

    /// Resolve a coded index; the null row yields `None`
    ///
    /// A tag selecting no table is malformed, a row past the end of the selected table is an
    /// unresolved reference from `referrer`.
    pub fn resolve_coded(
        &self,
        coded: CodedIndexType,
        value: u32,
        referrer: Token,
    ) -> Result<Option<Token>> {
        let index = coded.decode(value)?;
        if index.row == 0 {
            return Ok(None);
        }

        self.check_row(index.token, referrer)?;
        Ok(Some(index.token))
    }

    /// Resolve a coded index column that must not be null
    pub fn resolve_coded_required(
        &self,
        coded: CodedIndexType,
        value: u32,
        referrer: Token,
    ) -> Result<Token> {
        self.resolve_coded(coded, value, referrer)?.ok_or_else(|| {
            unresolved_error!(
                Token::new(value),
                referrer,
                "Required {:?} reference is null",
                coded
            )
        })
    }

    /// Fail unless `token` names an existing row
    pub fn check_row(&self, token: Token, referrer: Token) -> Result<()> {
        let Some(table) = token.table_id() else {
            return Err(malformed_error!(
                "{} in {} refers to an unknown table",
                token,
                referrer
            ));
        };

        if token.row() == 0 || token.row() > self.rows(table) {
            return Err(unresolved_error!(
                token,
                referrer,
                "{} has {} rows",
                table,
                self.rows(table)
            ));
        }
        Ok(())
    }

    /// Fail unless every type token inside `signature` names an existing row
    pub fn check_signature(&self, signature: &Signature, referrer: Token) -> Result<()> {
        for token in signature.tokens() {
            self.check_row(token, referrer)?;
        }
        Ok(())
    }

    /// Parse the signature blob at `index` with the configured nesting limit
    ///
    /// `TypeSpec` blobs go through the type-spec entry, every other column through the generic one.
    pub fn signature(&self, index: u32, type_spec: bool, referrer: Token) -> Result<Signature> {
        let data = self.blob(index)?;
        let mut parser =
            SignatureParser::new(data).with_max_depth(self.options.max_signature_depth);
        let flags = ParseFlags::MUST_BE_WHOLE_SIGNATURE;

        let signature = if type_spec {
            parser.parse_type_spec(flags)?
        } else {
            parser.parse(flags)?
        };

        self.check_signature(&signature, referrer)?;
        Ok(signature)
    }

    /// Decode row `rid` of `table` without filling anything; `None` past the last row
    pub fn row(&self, table: TableId, rid: u32) -> Result<Option<RowData<'a>>> {
        let Some(bytes) = self.header.row_data(table, rid) else {
            return Ok(None);
        };

        let mut parser = Parser::new(bytes);
        self.header
            .schemas
            .get(table)
            .read_row(&mut parser, rid)
            .map(Some)
    }

    /// The rows of `target` owned by `row` through its list column `column`
    ///
    /// A list runs from the row's start index up to the next row's start index, or to the end of
    /// `target` for the last row.
    pub fn list_range(
        &self,
        row: &RowData<'_>,
        column: usize,
        target: TableId,
    ) -> Result<Range<u32>> {
        let end_of_table = self.rows(target) + 1;
        let start = self.list_start(row.value(column)?, end_of_table, row.token(), target)?;

        let end = match self.row(row.table(), row.rid + 1)? {
            Some(next) => {
                self.list_start(next.value(column)?, end_of_table, next.token(), target)?
            }
            None => end_of_table,
        };

        if end < start {
            return Err(malformed_error!(
                "{} list of {} ends at {} before it starts at {}",
                target,
                row.token(),
                end,
                start
            ));
        }

        Ok(start..end)
    }

    fn list_start(
        &self,
        value: u32,
        end_of_table: u32,
        owner: Token,
        target: TableId,
    ) -> Result<u32> {
        match value {
            // Writers emit 0 when the target table is empty
            0 if end_of_table == 1 => Ok(1),
            0 => Err(malformed_error!("{} list of {} starts at row 0", target, owner)),
            start if start > end_of_table => Err(unresolved_error!(
                Token::from_parts(target, start),
                owner,
                "{} list starts past the last row {}",
                target,
                end_of_table - 1
            )),
            start => Ok(start),
        }
    }
}
