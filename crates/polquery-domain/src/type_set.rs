//! Rule-attached type sets.

use crate::error::{QueryResult, StoreResult};
use crate::store::Symbol;

/// Read access to a possibly complemented set of types, such as the target of a type
/// transition rule.
pub trait TypeSetSource {
    fn is_complemented(&self) -> StoreResult<bool>;

    fn included(&self) -> Box<dyn Iterator<Item = StoreResult<Symbol>> + '_>;

    /// Types subtracted from a complemented set.
    fn excluded(&self) -> Box<dyn Iterator<Item = StoreResult<Symbol>> + '_>;
}

/// Owned type set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSet {
    pub included: Vec<Symbol>,
    pub excluded: Vec<Symbol>,
    pub complemented: bool,
}

impl TypeSet {
    pub fn of(included: Vec<Symbol>) -> Self {
        TypeSet {
            included,
            excluded: Vec::new(),
            complemented: false,
        }
    }

    /// The set `~{ excluded }`.
    pub fn complement_of(excluded: Vec<Symbol>) -> Self {
        TypeSet {
            included: Vec::new(),
            excluded,
            complemented: true,
        }
    }

    /// Logical membership: presence in `included`, or for a complemented set, absence from
    /// `excluded`.
    pub fn contains(&self, ty: Symbol) -> bool {
        if self.complemented {
            !self.excluded.contains(&ty)
        } else {
            self.included.contains(&ty)
        }
    }
}

impl TypeSetSource for TypeSet {
    fn is_complemented(&self) -> StoreResult<bool> {
        Ok(self.complemented)
    }

    fn included(&self) -> Box<dyn Iterator<Item = StoreResult<Symbol>> + '_> {
        Box::new(self.included.iter().copied().map(Ok))
    }

    fn excluded(&self) -> Box<dyn Iterator<Item = StoreResult<Symbol>> + '_> {
        Box::new(self.excluded.iter().copied().map(Ok))
    }
}

/// Whether the set's stored members overlap `candidates`.
///
/// For a complemented set the stored members are the excluded types, so `true` means the
/// exclusion list touches `candidates`; otherwise it means an included type is a candidate.
/// Empty `candidates` never intersect.
pub fn type_set_intersects_any<T>(set: &T, candidates: &[Symbol]) -> QueryResult<bool>
where
    T: TypeSetSource + ?Sized,
{
    if candidates.is_empty() {
        return Ok(false);
    }
    let members = if set.is_complemented()? {
        set.excluded()
    } else {
        set.included()
    };
    for ty in members {
        if candidates.contains(&ty?) {
            return Ok(true);
        }
    }
    Ok(false)
}
