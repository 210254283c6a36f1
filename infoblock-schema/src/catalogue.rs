use crate::field::{FieldDescriptor, DEFAULT_FILE_FORMAT};
use rapidhash::RapidHashMap;
use tracing::warn;

/// The ordered list of fields a file header declares. Names are unique;
/// the first declaration of a name wins.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalogue {
    fields: Vec<FieldDescriptor>,
    by_name: RapidHashMap<String, usize>,
}

impl Catalogue {
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        let mut cat = Catalogue::default();
        for f in fields {
            cat.push(f);
        }
        cat
    }

    /// Collects every `##INFO` line of a VCF header, in header order. Other
    /// lines are skipped, as are INFO lines that fail to parse.
    pub fn from_header_text(header: &str) -> Self {
        let file_format = header
            .lines()
            .find(|l| l.starts_with("##fileformat="))
            .unwrap_or(DEFAULT_FILE_FORMAT);
        let mut cat = Catalogue::default();
        for line in header.lines().filter(|l| l.starts_with("##INFO=")) {
            match FieldDescriptor::parse_info_line(file_format, line) {
                Ok(f) => {
                    cat.push(f);
                }
                Err(_) => warn!(target: "infoblock", line, "skipping unreadable INFO header line"),
            }
        }
        cat
    }

    /// Appends a field, refusing a duplicate name. Returns whether it was added.
    pub fn push(&mut self, field: FieldDescriptor) -> bool {
        if self.by_name.contains_key(&field.name) {
            warn!(target: "infoblock", name = %field.name, "duplicate INFO declaration ignored");
            return false;
        }
        self.by_name.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        true
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|i| &self.fields[*i])
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
