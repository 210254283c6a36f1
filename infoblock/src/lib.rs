// An info store holds one registered schema and builds record blocks
// against it. The schema is fixed when the store is made: a header (or a
// catalogue) plus subscription options go in, and from then on every
// record of the file is planned and packed against the same layout.
//
// Blocks share nothing with each other or with the store beyond a `&Schema`,
// so a batch of records is built in parallel and each result is
// independent: one malformed record does not poison its neighbours.

use infoblock_base::Result;
use infoblock_heap::{build_record, BuildReport, RecordBlock};
use infoblock_schema::{Catalogue, Schema, SchemaOptions, Value};
use rayon::prelude::*;
use tracing::{debug, info};

mod view;


pub use infoblock_base::{Error, ErrorKind};
pub use infoblock_heap::{ArrayIndexEntry, StrView};
pub use infoblock_schema::{Arity, DeclaredType, FieldDescriptor, FieldId, HeapCounts, Subscription};
pub use view::InfoView;

/// One record's raw INFO column, with the ALT allele count when the caller
/// knows it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawRecord {
    pub info: String,
    pub alt_alleles: Option<usize>,
}

impl RawRecord {
    pub fn new(info: impl Into<String>) -> Self {
        RawRecord {
            info: info.into(),
            alt_alleles: None,
        }
    }

    pub fn with_alt_alleles(mut self, n: usize) -> Self {
        self.alt_alleles = Some(n);
        self
    }
}

#[derive(Debug)]
pub struct InfoStore {
    schema: Schema,
}

impl InfoStore {
    pub fn new(catalogue: &Catalogue, options: &SchemaOptions) -> Self {
        InfoStore {
            schema: Schema::subscribe(catalogue, options),
        }
    }

    /// Reads every `##INFO` line of a VCF header and subscribes per `options`.
    pub fn from_header(header: &str, options: &SchemaOptions) -> Self {
        let catalogue = Catalogue::from_header_text(header);
        InfoStore::new(&catalogue, options)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn build(&self, info: &str, alt_alleles: Option<usize>) -> Result<(RecordBlock, BuildReport)> {
        build_record(&self.schema, info, alt_alleles)
    }

    /// Builds every record in parallel. Results are in input order.
    pub fn build_batch(&self, records: &[RawRecord]) -> Vec<Result<(RecordBlock, BuildReport)>> {
        let results: Vec<_> = records
            .par_iter()
            .map(|r| build_record(&self.schema, &r.info, r.alt_alleles))
            .collect();
        let mut warnings = 0;
        let mut failed = 0;
        for r in &results {
            match r {
                Ok((_, report)) => warnings += report.warnings,
                Err(_) => failed += 1,
            }
        }
        info!(
            target: "infoblock",
            records = records.len(),
            failed,
            warnings,
            "built record batch"
        );
        results
    }

    pub fn view<'a>(&'a self, block: &'a RecordBlock) -> InfoView<'a> {
        InfoView::new(&self.schema, block)
    }

    /// Convenience for one-off lookups: builds `info` and reads `name`.
    pub fn lookup(&self, info: &str, name: &str) -> Result<Option<Value>> {
        let (block, _) = self.build(info, None)?;
        debug!(target: "infoblock", name, "one-off lookup");
        self.view(&block).get(name)
    }
}
