//! Metadata images for integration tests.
//!
//! [`Image`] collects raw column values per table and writes a `BSJB` root around them, sizing every
//! column with the crate's own schema resolution.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use cilnorm::metadata::{
    tables::{heap_sizes, CodedIndexType, TableId, TableInfo, TableSchemas},
    token::Token,
};
use strum::{EnumCount, IntoEnumIterator};

pub struct Image {
    rows: Vec<Vec<Vec<u32>>>,
    strings: Vec<u8>,
    string_offsets: HashMap<String, u32>,
    blobs: Vec<u8>,
    guids: Vec<u8>,
}

impl Image {
    pub fn new(module_name: &str) -> Self {
        let mut image = Image {
            rows: vec![Vec::new(); TableId::COUNT],
            strings: vec![0],
            string_offsets: HashMap::new(),
            blobs: vec![0],
            guids: vec![0x11; 16],
        };
        let name = image.string(module_name);
        image.row(TableId::Module, &[0, name, 1, 0, 0]);
        image
    }

    pub fn string(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if let Some(offset) = self.string_offsets.get(value) {
            return *offset;
        }
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        self.string_offsets.insert(value.to_string(), offset);
        offset
    }

    pub fn blob(&mut self, value: &[u8]) -> u32 {
        let offset = self.blobs.len() as u32;
        self.blobs.extend(compressed(value.len() as u32));
        self.blobs.extend_from_slice(value);
        offset
    }

    /// Grow `#Strings` past `size` bytes with unreferenced filler
    pub fn pad_strings(&mut self, size: usize) {
        while self.strings.len() <= size {
            self.strings.extend_from_slice(b"filler\0");
        }
    }

    pub fn row(&mut self, table: TableId, values: &[u32]) -> Token {
        let rows = &mut self.rows[table as usize];
        rows.push(values.to_vec());
        Token::from_parts(table, rows.len() as u32)
    }

    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].len() as u32
    }

    pub fn type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> Token {
        let scope = coded(CodedIndexType::ResolutionScope, scope);
        let name = self.string(name);
        let namespace = self.string(namespace);
        self.row(TableId::TypeRef, &[scope, name, namespace])
    }

    pub fn type_def(&mut self, namespace: &str, name: &str, extends: Option<Token>) -> Token {
        let name = self.string(name);
        let namespace = self.string(namespace);
        let extends = extends.map_or(0, |base| coded(CodedIndexType::TypeDefOrRef, base));
        let fields = self.rows(TableId::Field) + 1;
        let methods = self.rows(TableId::MethodDef) + 1;
        self.row(
            TableId::TypeDef,
            &[0x0010_0001, name, namespace, extends, fields, methods],
        )
    }

    pub fn field(&mut self, name: &str, signature: &[u8]) -> Token {
        let name = self.string(name);
        let signature = self.blob(signature);
        self.row(TableId::Field, &[0x0006, name, signature])
    }

    pub fn method(&mut self, name: &str, signature: &[u8]) -> Token {
        let name = self.string(name);
        let signature = self.blob(signature);
        let params = self.rows(TableId::Param) + 1;
        self.row(TableId::MethodDef, &[0, 0, 0x0086, name, signature, params])
    }

    pub fn param(&mut self, sequence: u32, name: &str) -> Token {
        let name = self.string(name);
        self.row(TableId::Param, &[0, sequence, name])
    }

    pub fn member_ref(&mut self, class: Token, name: &str, signature: &[u8]) -> Token {
        let class = coded(CodedIndexType::MemberRefParent, class);
        let name = self.string(name);
        let signature = self.blob(signature);
        self.row(TableId::MemberRef, &[class, name, signature])
    }

    pub fn build(&self) -> Vec<u8> {
        let streams = [
            ("#~", self.tables()),
            ("#Strings", self.strings.clone()),
            ("#Blob", self.blobs.clone()),
            ("#GUID", self.guids.clone()),
        ];

        let version = b"v4.0.30319\0\0";
        let directory: usize = streams
            .iter()
            .map(|(name, _)| 8 + align4(name.len() + 1))
            .sum();
        let mut offset = 16 + version.len() + 4 + directory;

        let mut root = Vec::new();
        root.extend_from_slice(b"BSJB");
        root.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0, 0]);
        root.extend_from_slice(&(version.len() as u32).to_le_bytes());
        root.extend_from_slice(version);
        root.extend_from_slice(&[0, 0]);
        root.extend_from_slice(&(streams.len() as u16).to_le_bytes());
        for (name, data) in &streams {
            root.extend_from_slice(&(offset as u32).to_le_bytes());
            root.extend_from_slice(&(data.len() as u32).to_le_bytes());
            let mut padded = name.as_bytes().to_vec();
            padded.resize(align4(name.len() + 1), 0);
            root.extend_from_slice(&padded);
            offset += align4(data.len());
        }
        for (_, data) in &streams {
            root.extend_from_slice(data);
            root.resize(align4(root.len()), 0);
        }
        root
    }

    fn tables(&self) -> Vec<u8> {
        let mut counts = [0_u32; TableId::COUNT];
        for table in TableId::iter() {
            counts[table as usize] = self.rows(table);
        }

        let mut flags = 0;
        if self.strings.len() > 0xFFFF {
            flags |= heap_sizes::LARGE_STRINGS;
        }
        if self.blobs.len() > 0xFFFF {
            flags |= heap_sizes::LARGE_BLOB;
        }
        let schemas = TableSchemas::resolve(Arc::new(TableInfo::new(&counts, flags))).unwrap();

        let present: Vec<TableId> = TableId::iter()
            .filter(|table| counts[*table as usize] > 0)
            .collect();
        let valid = present
            .iter()
            .fold(0_u64, |bits, table| bits | 1 << *table as u64);

        let mut data = vec![0, 0, 0, 0, 2, 0, flags, 1];
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());
        for table in &present {
            data.extend_from_slice(&counts[*table as usize].to_le_bytes());
        }
        for table in &present {
            let columns = &schemas.get(*table).columns;
            for row in &self.rows[*table as usize] {
                assert_eq!(row.len(), columns.len(), "column count of {table}");
                for (value, column) in row.iter().zip(columns) {
                    data.extend_from_slice(&value.to_le_bytes()[..usize::from(column.width)]);
                }
            }
        }
        data
    }
}

pub fn coded(kind: CodedIndexType, token: Token) -> u32 {
    let table = token.table_id().unwrap();
    let tag = kind
        .slots()
        .iter()
        .position(|slot| *slot == Some(table))
        .unwrap();
    (token.row() << kind.tag_bits()) | tag as u32
}

pub fn compressed(value: u32) -> Vec<u8> {
    match value {
        0..=0x7F => vec![value as u8],
        0x80..=0x3FFF => vec![0x80 | (value >> 8) as u8, value as u8],
        _ => vec![
            0xC0 | (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ],
    }
}

/// `CLASS` or `VALUETYPE` followed by a compressed `TypeDefOrRef` token
pub fn named_type(element: u8, token: Token) -> Vec<u8> {
    let tag = match token.table_id() {
        Some(TableId::TypeDef) => 0,
        Some(TableId::TypeRef) => 1,
        _ => 2,
    };
    let mut blob = vec![element];
    blob.extend(compressed((token.row() << 2) | tag));
    blob
}

/// Route `tracing` events of the crate to the test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn align4(value: usize) -> usize {
    (value + 3) & !3
}
