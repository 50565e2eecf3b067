// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal attribute bags standing in for RADIUS AVP lists.
//!
//! This crate doesn't encode or decode the RADIUS wire format (that's an
//! explicit non-goal); it only needs a name→octet-string container that
//! behaves like one, so `request_pairs`/`reply_pairs`/`session_state_pairs`
//! have somewhere to live.

use indexmap::IndexMap;

/// A single attribute: a name and its opaque octet-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Vec<u8>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// An ordered list of attributes, supporting repeats (RADIUS AVPs may
/// appear more than once with the same name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    pairs: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.pairs.iter()
    }

    /// `pair_find_by_attr`: first attribute matching `name`, if any.
    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.pairs.iter().find(|a| a.name == name)
    }

    /// `pair_append`: append an attribute to the list.
    pub fn append(&mut self, attr: Attribute) {
        self.pairs.push(attr);
    }

    /// Remove and return the first attribute matching `name`.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Attribute> {
        let idx = self.pairs.iter().position(|a| a.name == name)?;
        Some(self.pairs.remove(idx))
    }
}

/// The session-state attribute bag (`ctx` in spec terms): attributes that
/// must survive between rounds of a multi-round conversation. Backed by an
/// `IndexMap` so it has a stable iteration order for round-trip equality
/// checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    attrs: IndexMap<String, Attribute>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn insert(&mut self, attr: Attribute) {
        self.attrs.insert(attr.name.clone(), attr);
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.values()
    }
}
