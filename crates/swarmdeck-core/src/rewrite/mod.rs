// ABOUTME: Log rewrite pipeline for swarm client output.
// ABOUTME: rules holds the data-driven regex table, pipeline applies it line by line.

pub mod pipeline;
pub mod rules;

pub use pipeline::{Pipeline, Verdict};
pub use rules::{RuleDefinition, RuleSet, RuleSummary};
