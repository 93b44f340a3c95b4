//! Registry entities: records that keep their identity while every other field is edited.

/// A record identified by a stable id rather than by its contents.
///
/// A matrix keeps its id when it is renamed or even renumbered, so lookups
/// that must survive an edit go through the id, never the visible number.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;
}

/// Index of the record with `id` in a collection.
pub fn position_of<E: Entity>(records: &[E], id: E::Id) -> Option<usize> {
    records.iter().position(|r| *r.id() == id)
}

/// The record with `id`, if present.
pub fn find_by_id<E: Entity>(records: &[E], id: E::Id) -> Option<&E> {
    records.iter().find(|r| *r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::MatrixId;

    struct Tag {
        id: MatrixId,
        label: &'static str,
    }

    impl Entity for Tag {
        type Id = MatrixId;

        fn id(&self) -> &MatrixId {
            &self.id
        }
    }

    #[test]
    fn lookup_by_id_ignores_contents() {
        let a = MatrixId::new();
        let b = MatrixId::new();
        let records = [Tag { id: a, label: "same" }, Tag { id: b, label: "same" }];

        assert_eq!(position_of(&records, b), Some(1));
        assert_eq!(find_by_id(&records, a).map(|t| t.label), Some("same"));
        assert_eq!(position_of(&records, MatrixId::new()), None);
    }
}
