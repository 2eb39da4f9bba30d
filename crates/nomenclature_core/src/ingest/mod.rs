//! Source row ingestion.
//!
//! # Responsibility
//! - Map extracted spreadsheet cells into typed source records.
//!
//! Reading spreadsheet files is left to callers; this module starts from
//! string cells.

pub mod rows;

pub use rows::{
    count_indent_markers, map_declarable_row, map_nomenclature_row, map_row,
    map_section_binding_row, map_section_description_row, IngestError, IngestResult,
};
