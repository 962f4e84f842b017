//! Field mask capability and the shallow, presence-checked mask.

use crate::message::DynamicMessage;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// FieldMask is the capability an update needs from a mask: its paths, and
/// a validity check against the target message.
///
/// An absent mask is an `Option<M>` holding None: it has no paths and is
/// never valid.
pub trait FieldMask {
    /// Returns the mask paths in order.
    fn paths(&self) -> &[String];

    /// Returns true if the mask may be applied to the message. Absent
    /// messages are never valid.
    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool;
}

impl<M: FieldMask + ?Sized> FieldMask for &M {
    fn paths(&self) -> &[String] {
        (**self).paths()
    }

    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool {
        (**self).is_valid(message)
    }
}

impl<M: FieldMask + ?Sized> FieldMask for Box<M> {
    fn paths(&self) -> &[String] {
        (**self).paths()
    }

    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool {
        (**self).is_valid(message)
    }
}

impl<M: FieldMask> FieldMask for Option<M> {
    fn paths(&self) -> &[String] {
        match self {
            Some(mask) => mask.paths(),
            None => &[],
        }
    }

    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool {
        match self {
            Some(mask) => mask.is_valid(message),
            None => false,
        }
    }
}

/// Mask is a list of top-level field names.
///
/// Its validity check is shallow: every path is looked up verbatim as a
/// field name of the message (no dot splitting) and that field must be
/// populated. Nested paths are therefore never valid for a Mask; use a
/// [`SchemaMask`](super::SchemaMask) for those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    #[serde(default)]
    paths: Vec<String>,
}

impl Mask {
    /// Creates a mask from the given paths, without checking them.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mask {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends a path.
    pub fn push(&mut self, path: impl Into<String>) {
        self.paths.push(path.into());
    }

    /// Returns the number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the mask has no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns an iterator over the paths.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl FieldMask for Mask {
    fn paths(&self) -> &[String] {
        &self.paths
    }

    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool {
        let Some(message) = message else {
            return false;
        };
        self.paths.iter().all(|path| {
            message
                .descriptor()
                .field_by_name(path)
                .is_some_and(|field| message.has(&field))
        })
    }
}

/// Returns a mask with every populated field of the message.
///
/// Only top-level fields are included, in schema order; nested messages
/// are not descended into.
pub fn all(message: &DynamicMessage) -> Mask {
    Mask::new(message.fields().map(|(field, _)| field.name().to_string()))
}

/// Parses a comma separated list of paths. Blank entries are skipped.
impl FromStr for Mask {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Mask::new(
            s.split(',').map(str::trim).filter(|p| !p.is_empty()),
        ))
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paths.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all() {
        let book = testdata::book("{id: 1605, price: {cents: 1500}}");
        let mask = all(&book);
        assert!(mask.is_valid(Some(&book)));
        assert_eq!(mask.paths(), &["id".to_string(), "price".to_string()]);
    }

    #[test]
    fn test_all_schema_order_no_recursion() {
        let book = testdata::book(
            "{tags: [classic], price: {discount: {expires_at: 1}}, name: Don Quixote}",
        );
        assert_eq!(all(&book).to_string(), "name,price,tags");
    }

    #[test]
    fn test_all_empty_message() {
        let book = testdata::book("{}");
        let mask = all(&book);
        assert!(mask.is_empty());
        assert!(mask.is_valid(Some(&book)));
    }

    #[test]
    fn test_is_valid_unknown_field() {
        let book = testdata::book("{}");
        let mask = Mask::new(["Name"]);
        assert!(!mask.is_valid(Some(&book)));
        assert!(!mask.is_valid(None));
    }

    #[test]
    fn test_is_valid_unpopulated_field() {
        let book = testdata::book("{id: 1605}");
        assert!(Mask::new(["id"]).is_valid(Some(&book)));
        assert!(!Mask::new(["id", "name"]).is_valid(Some(&book)));
    }

    #[test]
    fn test_is_valid_nested_path_is_shallow() {
        let book = testdata::book("{price: {cents: 1500}}");
        assert!(Mask::new(["price"]).is_valid(Some(&book)));
        assert!(!Mask::new(["price.cents"]).is_valid(Some(&book)));
    }

    #[test]
    fn test_absent_mask() {
        let book = testdata::book("{id: 1605}");
        let mask: Option<Mask> = None;
        assert!(!mask.is_valid(Some(&book)));
        assert!(mask.paths().is_empty());

        let present = Some(Mask::new(["id"]));
        assert!(present.is_valid(Some(&book)));
        assert_eq!(present.paths().len(), 1);
    }

    #[test]
    fn test_from_str_and_display() {
        let mask: Mask = "name, price.discount,,id".parse().unwrap();
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec!["name", "price.discount", "id"]);
        assert_eq!(mask.to_string(), "name,price.discount,id");
        assert!("".parse::<Mask>().unwrap().is_empty());
    }

    #[test]
    fn test_push() {
        let book = testdata::book("{id: 1605, name: Don Quixote}");
        let mut mask = Mask::default();
        mask.push("id");
        assert!(mask.is_valid(Some(&book)));
        mask.push("price");
        assert_eq!(mask.len(), 2);
        assert!(!mask.is_valid(Some(&book)));
    }

    #[test]
    fn test_serde() {
        let mask: Mask = serde_json::from_str(r#"{"paths": ["name", "price"]}"#).unwrap();
        assert_eq!(mask, Mask::new(["name", "price"]));
        assert_eq!(
            serde_json::to_string(&mask).unwrap(),
            r#"{"paths":["name","price"]}"#
        );
    }

    #[test]
    fn test_dyn_mask() {
        let book = testdata::book("{id: 1605}");
        let boxed: Box<dyn FieldMask> = Box::new(Mask::new(["id"]));
        assert!(boxed.is_valid(Some(&book)));
        assert_eq!((&boxed).paths(), &["id".to_string()]);
    }
}
