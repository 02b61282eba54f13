// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message type filtering.
//!
//! Filters select messages by schema name. Data records whose type is
//! filtered out are skipped by length without being decoded. Schema
//! acknowledgement messages are named `FMT` and are subject to the same
//! filter.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::schema::SCHEMA_MSG_NAME;

/// Filter for selecting message types.
#[derive(Clone, Default)]
pub enum TypeFilter {
    /// Emit every message type (no filtering)
    #[default]
    All,
    /// Emit only the named types
    Include(HashSet<String>),
    /// Emit everything except the named types
    Exclude(HashSet<String>),
    /// Emit types whose name matches a regex
    RegexInclude(Arc<regex::Regex>),
    /// Custom filter function
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl fmt::Debug for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.debug_tuple("All").finish(),
            Self::Include(v) => f.debug_tuple("Include").field(v).finish(),
            Self::Exclude(v) => f.debug_tuple("Exclude").field(v).finish(),
            Self::RegexInclude(re) => f.debug_tuple("RegexInclude").field(&re.as_str()).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl TypeFilter {
    /// Check if a message type should be emitted.
    pub fn should_include(&self, msg_type: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Include(types) => types.contains(msg_type),
            TypeFilter::Exclude(types) => !types.contains(msg_type),
            TypeFilter::RegexInclude(re) => re.is_match(msg_type),
            TypeFilter::Custom(f) => f(msg_type),
        }
    }

    /// Whether schema acknowledgement messages are emitted.
    pub fn includes_schema_messages(&self) -> bool {
        self.should_include(SCHEMA_MSG_NAME)
    }

    /// Check if this filter lets everything through.
    pub fn is_all(&self) -> bool {
        matches!(self, TypeFilter::All)
    }

    /// Create an include filter from type names.
    pub fn include<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(types.into_iter().map(Into::into).collect())
    }

    /// Create an exclude filter from type names.
    pub fn exclude<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(types.into_iter().map(Into::into).collect())
    }

    /// Create a regex include filter.
    pub fn regex_include(pattern: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(pattern).map(|re| Self::RegexInclude(Arc::new(re)))
    }

    /// Create a custom filter from a function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}
