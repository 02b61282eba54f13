// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type id -> schema lookup.
//!
//! The table is populated while scanning (sequential mode) or by a head
//! pre-scan that runs before chunking (parallel mode). In parallel mode it is
//! frozen behind an [`Arc`] and shared read-only by every worker.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::plan::FieldPlan;
use super::record::{SchemaRecord, HEADER_LEN};
use crate::config::DecoderConfig;
use crate::{CodecError, Result};

/// A registered schema together with its compiled plan.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    record: SchemaRecord,
    name: Arc<str>,
    plan: std::result::Result<FieldPlan, CodecError>,
    declared_at: u64,
}

impl MessageSchema {
    /// Compile a schema from its record.
    ///
    /// A plan that fails to compile is kept as an error: the schema still
    /// frames its records, but every decode of it fails.
    pub fn new(record: SchemaRecord, declared_at: u64, config: &DecoderConfig) -> Self {
        let plan = FieldPlan::compile(&record.name, &record.format, &record.columns, config);
        Self {
            name: Arc::from(record.name.as_str()),
            record,
            plan,
            declared_at,
        }
    }

    /// Declared type id.
    pub fn type_id(&self) -> u8 {
        self.record.type_id
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total record length, header included.
    pub fn record_len(&self) -> usize {
        self.record.record_len()
    }

    /// Bytes available to the payload of one record.
    pub fn payload_len(&self) -> usize {
        self.record_len().saturating_sub(HEADER_LEN)
    }

    /// The parsed schema record.
    pub fn record(&self) -> &SchemaRecord {
        &self.record
    }

    /// Compiled field plan.
    pub fn plan(&self) -> Result<&FieldPlan> {
        self.plan.as_ref().map_err(Clone::clone)
    }

    /// Offset of the schema record that declared this type.
    pub fn declared_at(&self) -> u64 {
        self.declared_at
    }

    /// Whether a record at `offset` may use this schema.
    pub fn is_visible_at(&self, offset: u64) -> bool {
        self.declared_at < offset
    }
}

/// Mapping from message type id to schema, one slot per possible id.
#[derive(Clone)]
pub struct FormatTable {
    slots: Vec<Option<Arc<MessageSchema>>>,
    count: usize,
}

impl FormatTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            slots: vec![None; 256],
            count: 0,
        }
    }

    /// Parse a schema record and register it.
    pub fn register(
        &mut self,
        record_bytes: &[u8],
        offset: u64,
        config: &DecoderConfig,
    ) -> Result<Arc<MessageSchema>> {
        let record = SchemaRecord::parse(record_bytes)?;
        self.install(record, offset, config)
    }

    /// Register an already parsed schema record.
    ///
    /// The first registration of a type id wins; later records for the same
    /// id are ignored and the existing schema is returned. Records declaring
    /// a length shorter than the record header are rejected.
    pub fn install(
        &mut self,
        record: SchemaRecord,
        offset: u64,
        config: &DecoderConfig,
    ) -> Result<Arc<MessageSchema>> {
        if record.record_len() < HEADER_LEN {
            return Err(CodecError::invalid_schema(
                &record.name,
                format!(
                    "record length {} is shorter than the {HEADER_LEN} byte header",
                    record.length
                ),
            ));
        }

        let slot = &mut self.slots[record.type_id as usize];
        if let Some(existing) = slot {
            if existing.record() != &record {
                debug!(
                    type_id = record.type_id,
                    name = %record.name,
                    offset,
                    "Ignoring redefinition of registered type"
                );
            }
            return Ok(Arc::clone(existing));
        }

        let schema = MessageSchema::new(record, offset, config);
        match &schema.plan {
            Ok(plan) if plan.payload_size > schema.payload_len() => warn!(
                name = %schema.name,
                payload = plan.payload_size,
                available = schema.payload_len(),
                "Schema fields exceed the declared record length"
            ),
            Ok(_) => {}
            Err(e) => warn!(name = %schema.name, error = %e, "Schema plan failed to compile"),
        }

        let schema = Arc::new(schema);
        *slot = Some(Arc::clone(&schema));
        self.count += 1;
        Ok(schema)
    }

    /// Look up a schema by type id.
    #[inline]
    pub fn get(&self, type_id: u8) -> Option<&Arc<MessageSchema>> {
        self.slots[type_id as usize].as_ref()
    }

    /// Look up a schema that a record at `offset` may use.
    #[inline]
    pub fn visible_at(&self, type_id: u8, offset: u64) -> Option<&Arc<MessageSchema>> {
        self.get(type_id).filter(|s| s.is_visible_at(offset))
    }

    /// Check if a type id is registered.
    pub fn contains(&self, type_id: u8) -> bool {
        self.get(type_id).is_some()
    }

    /// Find a schema by name.
    pub fn by_name(&self, name: &str) -> Option<&Arc<MessageSchema>> {
        self.iter().find(|s| s.name() == name)
    }

    /// Registered schemas in type id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MessageSchema>> {
        self.slots.iter().flatten()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|s| (s.type_id(), s.name())))
            .finish()
    }
}
