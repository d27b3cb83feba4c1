//! Order line-item extraction.

pub mod aggregate;
pub mod anchor;
pub mod coordinate;
pub mod name_buffer;
mod parser;
pub mod rules;

pub use aggregate::{aggregate, Aggregator};
pub use anchor::{AnchorSequenceParser, ClassifiedLine, ParseState};
pub use coordinate::{group_rows, ColumnLayout, CoordinateParser};
pub use name_buffer::{finalize_name, NameBuffer};
pub use parser::{ExtractionResult, OrderExtractor};

use crate::document::Document;
use crate::models::order::{Diagnostics, Record, Strategy};

/// A strategy turning a document into raw records.
pub trait RecordExtractor {
    /// Which strategy this is, for diagnostics.
    fn strategy(&self) -> Strategy;

    /// Extract records in document order, updating `diagnostics` as it goes.
    fn extract(&self, document: &Document, diagnostics: &mut Diagnostics) -> Vec<Record>;
}
