use crate::error::QueryResult;
use crate::store::SymbolStore;
use polquery_types::SymbolKind;
use std::cmp::Ordering;

/// An object class together with a set of its permissions.
///
/// Permissions keep their insertion order and are never duplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjPerm {
    class_name: Option<String>,
    perms: Vec<String>,
}

impl ObjPerm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the class name; `None` clears it.
    pub fn set_class_name(&mut self, name: Option<&str>) {
        self.class_name = name.map(str::to_string);
    }

    /// Adds a permission unless already present. `None` empties the permission set.
    pub fn append_perm(&mut self, perm: Option<&str>) {
        match perm {
            Some(perm) => {
                if !self.perms.iter().any(|p| p == perm) {
                    self.perms.push(perm.to_string());
                }
            }
            None => self.perms.clear(),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn perms(&self) -> &[String] {
        &self.perms
    }

    /// Orders by the classes' policy values. A missing or unknown class sorts as value 0.
    pub fn cmp_by_policy_order<S>(&self, other: &ObjPerm, store: &S) -> QueryResult<Ordering>
    where
        S: SymbolStore + ?Sized,
    {
        Ok(class_value(store, self.class_name())?.cmp(&class_value(store, other.class_name())?))
    }
}

fn class_value<S>(store: &S, name: Option<&str>) -> QueryResult<u32>
where
    S: SymbolStore + ?Sized,
{
    let Some(name) = name else {
        return Ok(0);
    };
    match store.lookup(SymbolKind::Class, name)? {
        Some(class) => Ok(store.numeric_value(class)?),
        None => Ok(0),
    }
}

/// Stable sort of `items` by class policy order.
pub fn sort_by_policy_order<S>(store: &S, items: &mut [ObjPerm]) -> QueryResult<()>
where
    S: SymbolStore + ?Sized,
{
    sort_by_policy_order_with(store, items, |item| item)
}

/// [`sort_by_policy_order`] for values that carry an [`ObjPerm`].
///
/// Every key is resolved before anything moves, so on error `items` is left untouched.
pub fn sort_by_policy_order_with<S, T, F>(
    store: &S,
    items: &mut [T],
    obj_perm: F,
) -> QueryResult<()>
where
    S: SymbolStore + ?Sized,
    T: Default,
    F: Fn(&T) -> &ObjPerm,
{
    let keys = items
        .iter()
        .map(|item| class_value(store, obj_perm(item).class_name()))
        .collect::<QueryResult<Vec<u32>>>()?;
    let mut keyed: Vec<(u32, T)> = keys
        .into_iter()
        .zip(items.iter_mut().map(std::mem::take))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    for (slot, (_, item)) in items.iter_mut().zip(keyed) {
        *slot = item;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::targeted_policy;

    fn obj(class: &str, perms: &[&str]) -> ObjPerm {
        let mut op = ObjPerm::new();
        op.set_class_name(Some(class));
        for perm in perms {
            op.append_perm(Some(perm));
        }
        op
    }

    #[test]
    fn new_is_empty() {
        let op = ObjPerm::new();
        assert_eq!(op.class_name(), None);
        assert!(op.perms().is_empty());
    }

    #[test]
    fn append_dedups_and_keeps_order() {
        let op = obj("file", &["write", "read", "write", "getattr"]);
        assert_eq!(op.perms(), ["write", "read", "getattr"]);
    }

    #[test]
    fn append_none_clears_permissions() {
        let mut op = obj("file", &["read", "write"]);
        op.append_perm(None);
        assert!(op.perms().is_empty());
        assert_eq!(op.class_name(), Some("file"));
        op.append_perm(Some("open"));
        assert_eq!(op.perms(), ["open"]);
    }

    #[test]
    fn set_class_name_replaces_and_clears() {
        let mut op = obj("file", &[]);
        op.set_class_name(Some("dir"));
        assert_eq!(op.class_name(), Some("dir"));
        op.set_class_name(None);
        assert_eq!(op.class_name(), None);
    }

    #[test]
    fn policy_order_is_by_class_value_not_name() {
        let store = targeted_policy();
        // Declared order: file, dir, process.
        let file = obj("file", &["read"]);
        let dir = obj("dir", &["search"]);
        assert_eq!(file.cmp_by_policy_order(&dir, &store).unwrap(), Ordering::Less);
        assert_eq!(dir.cmp_by_policy_order(&file, &store).unwrap(), Ordering::Greater);
        assert_eq!(file.cmp_by_policy_order(&file, &store).unwrap(), Ordering::Equal);

        let unknown = obj("socket", &[]);
        assert_eq!(
            unknown.cmp_by_policy_order(&file, &store).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn sort_uses_policy_order() {
        let store = targeted_policy();
        let mut items = vec![obj("process", &[]), obj("file", &[]), obj("dir", &[])];
        sort_by_policy_order(&store, &mut items).unwrap();
        let names: Vec<_> = items.iter().filter_map(ObjPerm::class_name).collect();
        assert_eq!(names, vec!["file", "dir", "process"]);
    }

    #[test]
    fn sort_is_stable_and_keeps_permissions() {
        let store = targeted_policy();
        let mut items = vec![
            obj("dir", &["search"]),
            obj("socket", &["bind"]),
            obj("file", &["read", "write"]),
            obj("pipe", &["open"]),
            obj("dir", &["read"]),
        ];
        sort_by_policy_order(&store, &mut items).unwrap();
        let summary: Vec<(&str, &[String])> = items
            .iter()
            .map(|op| (op.class_name().unwrap_or_default(), op.perms()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("socket", &["bind".to_string()][..]),
                ("pipe", &["open".to_string()][..]),
                ("file", &["read".to_string(), "write".to_string()][..]),
                ("dir", &["search".to_string()][..]),
                ("dir", &["read".to_string()][..]),
            ]
        );
    }

    #[test]
    fn sort_with_carries_payload() {
        let store = targeted_policy();
        let mut items = vec![
            (3_u32, obj("process", &[])),
            (1, obj("file", &[])),
            (2, obj("dir", &[])),
        ];
        sort_by_policy_order_with(&store, &mut items, |(_, op)| op).unwrap();
        let values: Vec<u32> = items.iter().map(|(value, _)| *value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
