use crate::{
    block::RecordBlock,
    heap::{ArrayIndexEntry, HeapScalar, StrView},
};
use infoblock_base::{err, Result};
use infoblock_schema::{DynamicClass, FieldId, InternalRepresentation as R, Primitive, ResourceHandle, Value};
use ordered_float::OrderedFloat;

impl RecordBlock {
    /// Whether the record's INFO text named this field at all.
    pub fn is_present(&self, handle: &ResourceHandle) -> bool {
        self.present.get(handle.id.index())
    }

    pub fn find_array(&self, id: FieldId) -> Option<&ArrayIndexEntry> {
        self.arrays
            .binary_search_by_key(&id, |e| e.field_id)
            .ok()
            .map(|i| &self.arrays[i])
    }

    /// Reads a field back in its typed form. Errors only on an internal
    /// inconsistency between the handle and the block.
    pub fn get(&self, handle: &ResourceHandle) -> Result<Value> {
        match handle.class {
            DynamicClass::Fixed => self.get_fixed(handle),
            DynamicClass::FixedDynamic => {
                if !self.slot_is_missing(handle)? {
                    return self.get_fixed(handle);
                }
                match self.find_array(handle.id) {
                    Some(e) => self.read_entry(handle, e),
                    None => Ok(empty(handle.primitive)),
                }
            }
            DynamicClass::Dynamic => match self.find_array(handle.id) {
                Some(e) => self.read_entry(handle, e),
                None if self.is_present(handle) => Err(err(format!(
                    "field {} present but has no array entry",
                    handle.id
                ))),
                None => Ok(empty(handle.primitive)),
            },
        }
    }

    pub fn get_bool(&self, handle: &ResourceHandle) -> Result<bool> {
        match self.get(handle)? {
            Value::Bool(b) => Ok(b),
            _ => Err(err(format!("field {} is not a flag", handle.id))),
        }
    }

    pub fn get_ints(&self, handle: &ResourceHandle) -> Result<Vec<Option<i32>>> {
        match self.get(handle)? {
            Value::Ints(v) => Ok(v),
            _ => Err(err(format!("field {} is not an integer field", handle.id))),
        }
    }

    pub fn get_floats(&self, handle: &ResourceHandle) -> Result<Vec<Option<OrderedFloat<f32>>>> {
        match self.get(handle)? {
            Value::Floats(v) => Ok(v),
            _ => Err(err(format!("field {} is not a float field", handle.id))),
        }
    }

    pub fn get_strings(&self, handle: &ResourceHandle) -> Result<Vec<String>> {
        match self.get(handle)? {
            Value::Strings(v) => Ok(v),
            _ => Err(err(format!("field {} is not a string field", handle.id))),
        }
    }

    fn slot_is_missing(&self, h: &ResourceHandle) -> Result<bool> {
        Ok(match h.primitive {
            Primitive::Int => *slot(&self.ints, h)? == i32::MISSING,
            Primitive::Float => *slot(&self.floats, h)? == f32::MISSING,
            Primitive::String => slot(&self.views, h)?.is_missing(),
            Primitive::Bool => false,
        })
    }

    fn get_fixed(&self, h: &ResourceHandle) -> Result<Value> {
        match h.repr {
            R::FixedBool | R::Unresolved => {
                if h.static_size == 0 {
                    Ok(Value::Bool(self.is_present(h)))
                } else {
                    Ok(Value::Bool(*slot(&self.chars, h)? != 0))
                }
            }
            R::FixedInt | R::AssumedScalarInt => Ok(Value::Ints(
                scalar_list(*slot(&self.ints, h)?).collect(),
            )),
            R::FixedFloat | R::AssumedScalarFloat => Ok(Value::Floats(
                scalar_list(*slot(&self.floats, h)?).map(|x| x.map(OrderedFloat)).collect(),
            )),
            R::FixedString | R::AssumedScalarString => {
                let view = *slot(&self.views, h)?;
                if view.is_missing() || view.len == 0 {
                    Ok(Value::Strings(Vec::new()))
                } else {
                    Ok(Value::Strings(vec![self.read_str(view)?]))
                }
            }
            R::FixedIntArray | R::FixedFloatArray | R::FixedStringArray => {
                let e = self
                    .find_array(h.id)
                    .ok_or_else(|| err(format!("fixed array field {} has no array entry", h.id)))?;
                self.read_entry(h, e)
            }
            R::DynamicIntArray | R::DynamicFloatArray | R::DynamicStringArray => {
                Err(err(format!("dynamic field {} read as fixed", h.id)))
            }
        }
    }

    fn read_entry(&self, h: &ResourceHandle, e: &ArrayIndexEntry) -> Result<Value> {
        let range = e.range()?;
        let oob = || err(format!("array entry {:?} outside its heap", e));
        match h.primitive {
            Primitive::Int => {
                let run = self.ints.get(range).ok_or_else(oob)?;
                Ok(Value::Ints(run.iter().map(|x| present(*x)).collect()))
            }
            Primitive::Float => {
                let run = self.floats.get(range).ok_or_else(oob)?;
                Ok(Value::Floats(
                    run.iter().map(|x| present(*x).map(OrderedFloat)).collect(),
                ))
            }
            Primitive::String => {
                let run = self.views.get(range).ok_or_else(oob)?;
                let strings = run
                    .iter()
                    .map(|v| self.read_str(*v))
                    .collect::<Result<Vec<String>>>()?;
                Ok(Value::Strings(strings))
            }
            Primitive::Bool => Err(err(format!("flag field {} has an array entry", h.id))),
        }
    }

    // Copies out of the char heap; the view never leaves the block.
    fn read_str(&self, view: StrView) -> Result<String> {
        if view.is_missing() {
            return Err(err("read through a missing string view"));
        }
        let bytes = self
            .chars
            .get(view.range())
            .ok_or_else(|| err(format!("string view {:?} outside char heap", view)))?;
        Ok(std::str::from_utf8(bytes)?.to_string())
    }
}

fn slot<'b, T>(heap: &'b [T], h: &ResourceHandle) -> Result<&'b T> {
    heap.get(h.static_offset)
        .ok_or_else(|| err(format!("static slot {} of field {} outside heap", h.static_offset, h.id)))
}

fn present<T: HeapScalar>(v: T) -> Option<T> {
    if v == T::MISSING {
        None
    } else {
        Some(v)
    }
}

// A scalar slot reads as a one-element list, or an empty one when missing.
fn scalar_list<T: HeapScalar>(v: T) -> impl Iterator<Item = Option<T>> {
    present(v).map(Some).into_iter()
}

fn empty(p: Primitive) -> Value {
    match p {
        Primitive::Bool => Value::Bool(false),
        Primitive::Int => Value::Ints(Vec::new()),
        Primitive::Float => Value::Floats(Vec::new()),
        Primitive::String => Value::Strings(Vec::new()),
    }
}
