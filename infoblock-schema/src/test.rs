use crate::{Arity, DeclaredType, FieldDescriptor};


pub(crate) fn fd(name: &str, ty: DeclaredType, arity: Arity) -> FieldDescriptor {
    FieldDescriptor::new(name, ty, arity)
}
