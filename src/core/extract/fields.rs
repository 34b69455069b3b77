use std::borrow::Cow;

use swc_ecma_ast::{Expr, ObjectLit, Prop, PropOrSpread};

use super::error::ExtractError;
use crate::core::{collect::helpers::extract_prop_name, data::ops::lookup_key};

/// The properties of an object literal, keyed by normalized field name.
///
/// Extractors `take` the fields they understand and then call `finish`, which
/// rejects whatever is left. Shorthand properties (`{ dataset }`) are kept as an
/// identifier expression so they resolve like `{ dataset: dataset }`.
pub struct ObjectFields<'a> {
    owner: &'static str,
    /// (authored key, normalized key, value), in source order.
    entries: Vec<(String, String, Cow<'a, Expr>)>,
}

impl<'a> ObjectFields<'a> {
    pub fn new(obj: &'a ObjectLit, owner: &'static str) -> Result<Self, ExtractError> {
        let mut entries = Vec::with_capacity(obj.props.len());
        for prop in &obj.props {
            let PropOrSpread::Prop(prop) = prop else {
                return Err(ExtractError::Spread { owner });
            };
            match &**prop {
                Prop::KeyValue(kv) => {
                    let key = extract_prop_name(&kv.key).ok_or_else(|| {
                        ExtractError::invalid("key", "a static property name")
                    })?;
                    let normalized = lookup_key(&key);
                    entries.push((key, normalized, Cow::Borrowed(&*kv.value)));
                }
                Prop::Shorthand(ident) => {
                    let key = ident.sym.to_string();
                    let normalized = lookup_key(&key);
                    entries.push((key, normalized, Cow::Owned(Expr::Ident(ident.clone()))));
                }
                _ => {
                    return Err(ExtractError::invalid(
                        owner,
                        "an object of plain `key: value` properties",
                    ));
                }
            }
        }
        Ok(Self { owner, entries })
    }

    /// Remove and return a field. The last occurrence wins, as in JavaScript.
    pub fn take(&mut self, key: &str) -> Option<Cow<'a, Expr>> {
        let mut found = None;
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].1 == key {
                found = Some(self.entries.remove(i).2);
            } else {
                i += 1;
            }
        }
        found
    }

    /// Remove the first field present among `keys` (aliases of one field).
    pub fn take_any(&mut self, keys: &[&str]) -> Option<Cow<'a, Expr>> {
        keys.iter().find_map(|key| self.take(key))
    }

    /// Reject any field that was not taken.
    pub fn finish(self) -> Result<(), ExtractError> {
        match self.entries.into_iter().next() {
            Some((field, _, _)) => Err(ExtractError::UnknownField {
                owner: self.owner,
                field,
            }),
            None => Ok(()),
        }
    }
}
