use infoblock_base::{parse_err, Result};
use infoblock_schema::MISSING_TEXT;
use rapidhash::RapidHashMap;
use tracing::warn;

pub const FIELD_SEPARATOR: u8 = b';';
pub const KEY_VALUE_SEPARATOR: u8 = b'=';
pub const ITEM_SEPARATOR: u8 = b',';

/// One `key=value` (or bare `key`) entry of an INFO column. `text` borrows
/// the record's own buffer; `count` is the number of comma-separated items
/// in it, which is zero for bare keys and for empty values (`key=`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoToken<'a> {
    pub text: &'a str,
    pub count: usize,
    pub bare: bool,
}

impl<'a> InfoToken<'a> {
    pub fn new(text: &'a str) -> Self {
        let count = if text.is_empty() {
            0
        } else {
            memchr::memchr_iter(ITEM_SEPARATOR, text.as_bytes()).count() + 1
        };
        InfoToken {
            text,
            count,
            bare: false,
        }
    }

    /// A key written without `=`.
    pub fn bare() -> Self {
        InfoToken {
            text: "",
            count: 0,
            bare: true,
        }
    }

    pub fn is_flag(&self) -> bool {
        self.bare
    }

    pub fn items(&self) -> impl Iterator<Item = &'a str> {
        self.text.split(ITEM_SEPARATOR as char).take(self.count)
    }

    /// Bytes the first `n` items occupy once their separators are dropped.
    pub fn item_bytes(&self, n: usize) -> usize {
        if n >= self.count {
            self.text.len() - self.count.saturating_sub(1)
        } else {
            self.items().take(n).map(str::len).sum()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InfoTokens<'a> {
    map: RapidHashMap<&'a str, InfoToken<'a>>,
}

impl<'a> InfoTokens<'a> {
    pub fn get(&self, key: &str) -> Option<&InfoToken<'a>> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&&'a str, &InfoToken<'a>)> {
        self.map.iter()
    }

    fn insert(&mut self, key: &'a str, token: InfoToken<'a>) {
        if key.is_empty() {
            // Stray or doubled ';'.
            return;
        }
        if self.map.contains_key(key) {
            warn!(target: "infoblock", key, "repeated INFO key, keeping the first");
            return;
        }
        self.map.insert(key, token);
    }
}

#[derive(Clone, Copy, Debug)]
enum State<'a> {
    Key { start: usize },
    Value { key: &'a str, start: usize },
}

/// Splits INFO text into key -> token without copying. A single forward
/// scan over the `;` and `=` delimiters; `,` items are counted, not split.
/// Fails on whitespace inside the column, on an empty key before `=`, and
/// on a trailing `=` with nothing after it.
pub fn tokenize(info: &str) -> Result<InfoTokens<'_>> {
    let mut tokens = InfoTokens::default();
    if info.is_empty() || info == MISSING_TEXT {
        return Ok(tokens);
    }
    let bytes = info.as_bytes();
    if let Some(pos) = memchr::memchr3(b'\t', b'\n', b'\r', bytes) {
        return Err(parse_err(format!("whitespace at byte {} of INFO text", pos)));
    }
    let mut state = State::Key { start: 0 };
    for pos in memchr::memchr2_iter(FIELD_SEPARATOR, KEY_VALUE_SEPARATOR, bytes) {
        state = match (state, bytes[pos]) {
            (State::Key { start }, KEY_VALUE_SEPARATOR) => {
                if start == pos {
                    return Err(parse_err(format!("empty INFO key at byte {}", pos)));
                }
                State::Value {
                    key: &info[start..pos],
                    start: pos + 1,
                }
            }
            (State::Key { start }, _) => {
                tokens.insert(&info[start..pos], InfoToken::bare());
                State::Key { start: pos + 1 }
            }
            (State::Value { key, start }, FIELD_SEPARATOR) => {
                tokens.insert(key, InfoToken::new(&info[start..pos]));
                State::Key { start: pos + 1 }
            }
            // A later '=' belongs to the value.
            (value @ State::Value { .. }, _) => value,
        };
    }
    match state {
        State::Key { start } => tokens.insert(&info[start..], InfoToken::bare()),
        State::Value { key, start } if start == info.len() => {
            return Err(parse_err(format!("unterminated value for INFO key {}", key)));
        }
        State::Value { key, start } => tokens.insert(key, InfoToken::new(&info[start..])),
    }
    Ok(tokens)
}
