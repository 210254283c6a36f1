use infoblock_base::{schema_err, Error, ErrorKind, Result};
use noodles_vcf::{
    header::record::value::map::info::{Number, Type},
    Header,
};
use serde::{Deserialize, Serialize};

/// Used when a header gives no `##fileformat` line of its own.
pub const DEFAULT_FILE_FORMAT: &str = "##fileformat=VCFv4.3";

const COLUMN_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

// The primitive type a header declares for a field. `Character` in a
// header is folded into `String`; `Flag` becomes `Boolean`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DeclaredType {
    Boolean,
    Integer,
    Float,
    String,
}

impl From<Type> for DeclaredType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Flag => DeclaredType::Boolean,
            Type::Integer => DeclaredType::Integer,
            Type::Float => DeclaredType::Float,
            Type::Character | Type::String => DeclaredType::String,
        }
    }
}

// The declared cardinality of a field, from the header's Number= attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Arity {
    Zero,          // Number=0, flags
    Scalar,        // Number=1
    Fixed(u32),    // Number=N, N >= 2
    PerAltAllele,  // Number=A
    PerAllAllele,  // Number=R
    PerGenotype,   // Number=G
    Variable,      // Number=.
}

impl Arity {
    /// Element count when the arity pins one down independent of the record.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Arity::Zero => Some(0),
            Arity::Scalar => Some(1),
            Arity::Fixed(n) => Some(*n as usize),
            _ => None,
        }
    }

    /// Expected item count for a record with `alt_alleles` alternates, where
    /// that is knowable without genotype ploidy.
    pub fn expected_len(&self, alt_alleles: usize) -> Option<usize> {
        match self {
            Arity::PerAltAllele => Some(alt_alleles),
            Arity::PerAllAllele => Some(alt_alleles + 1),
            _ => self.fixed_len(),
        }
    }
}

impl From<Number> for Arity {
    fn from(number: Number) -> Self {
        match number {
            Number::Count(0) => Arity::Zero,
            Number::Count(1) => Arity::Scalar,
            Number::Count(n) => Arity::Fixed(u32::try_from(n).unwrap_or(u32::MAX)),
            Number::AlternateBases => Arity::PerAltAllele,
            Number::ReferenceAlternateBases => Arity::PerAllAllele,
            Number::Samples => Arity::PerGenotype,
            // Number=. and the local-allele forms of newer VCF versions.
            _ => Arity::Variable,
        }
    }
}

/// One declared INFO field: name, cardinality and primitive type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: DeclaredType,
    pub declared_arity: Arity,
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType, declared_arity: Arity) -> Self {
        FieldDescriptor {
            name: name.into(),
            declared_type,
            declared_arity,
            description: None,
        }
    }

    /// Parses a single `##INFO=<ID=..,Number=..,Type=..,Description="..">`
    /// meta-information line under the default file format.
    pub fn parse_header_line(line: &str) -> Result<Self> {
        FieldDescriptor::parse_info_line(DEFAULT_FILE_FORMAT, line)
    }

    /// Parses one INFO line as it would read under `file_format` (a whole
    /// `##fileformat=...` line). The line is wrapped in the smallest header
    /// noodles accepts, so one bad declaration never costs the others.
    pub fn parse_info_line(file_format: &str, line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.starts_with("##INFO=") {
            return Err(schema_err(format!("not an INFO header line: {}", line)));
        }
        let text = format!("{}\n{}\n{}\n", file_format, line, COLUMN_HEADER);
        let header: Header = text
            .parse()
            .map_err(|e| Error::with_kind(ErrorKind::Schema, e))?;
        let (name, info) = header
            .infos()
            .iter()
            .next()
            .ok_or_else(|| schema_err(format!("no INFO record in {}", line)))?;
        let description = info.description();
        Ok(FieldDescriptor {
            name: name.to_string(),
            declared_type: info.ty().into(),
            declared_arity: info.number().into(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}
