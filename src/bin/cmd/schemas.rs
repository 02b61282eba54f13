// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schemas command - list the FMT definitions found in a log.

use std::path::PathBuf;

use clap::Args;
use mavlog::schema::SCHEMA_MSG_NAME;
use mavlog::{DecoderConfig, MavReader, TypeFilter};
use serde::Serialize;

use crate::common::Result;

/// List the schemas declared in a log.
#[derive(Args, Clone, Debug)]
pub struct SchemasCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only show schemas whose name contains this text
    #[arg(value_name = "NAME")]
    name: Option<String>,

    /// Print the compiled field plan of each schema
    #[arg(long)]
    plans: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct SchemaEntry<'a> {
    type_id: u8,
    name: &'a str,
    length: u8,
    format: &'a str,
    columns: &'a [String],
    declared_at: u64,
    payload_size: Option<usize>,
    error: Option<String>,
}

impl SchemasCmd {
    pub fn run(self, config: DecoderConfig) -> Result<()> {
        let reader = MavReader::open_with_config(&self.input, config)?;

        // Only schema records are decoded; data records are framed and skipped.
        let mut scan = reader
            .sequential()?
            .with_filter(TypeFilter::include([SCHEMA_MSG_NAME]));
        scan.by_ref().for_each(drop);

        let schemas: Vec<_> = scan
            .schemas()
            .iter()
            .filter(|s| self.name.as_deref().map_or(true, |n| s.name().contains(n)))
            .collect();

        if self.json {
            let entries: Vec<SchemaEntry> = schemas
                .iter()
                .map(|s| {
                    let record = s.record();
                    let plan = s.plan();
                    SchemaEntry {
                        type_id: s.type_id(),
                        name: s.name(),
                        length: record.length,
                        format: &record.format,
                        columns: &record.columns,
                        declared_at: s.declared_at(),
                        payload_size: plan.as_ref().ok().map(|p| p.payload_size),
                        error: plan.err().map(|e| e.to_string()),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        for schema in &schemas {
            let record = schema.record();
            println!(
                "[{:3}] {} ({} bytes) format '{}' @ offset {}",
                schema.type_id(),
                schema.name(),
                record.length,
                record.format,
                schema.declared_at()
            );
            println!("      {}", record.columns.join(","));
            if self.plans {
                match schema.plan() {
                    Ok(plan) => {
                        for line in plan.to_string().lines() {
                            println!("      {line}");
                        }
                    }
                    Err(e) => println!("      (no plan: {e})"),
                }
            }
        }

        if schemas.is_empty() {
            match self.name {
                Some(name) => println!("No schema matching: {name}"),
                None => println!("No schemas found"),
            }
        }

        Ok(())
    }
}
