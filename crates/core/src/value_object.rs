//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Two farrowing outcomes with the same date and litter counts are the same
/// outcome; they have no identity of their own and are replaced wholesale when
/// amended.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Litter {
///     born_alive: u32,
///     stillborn: u32,
/// }
///
/// impl ValueObject for Litter {}
///
/// assert_eq!(Litter { born_alive: 11, stillborn: 1 }, Litter { born_alive: 11, stillborn: 1 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
