// ABOUTME: Data-driven rule table for the log rewrite pipeline.
// ABOUTME: Raw TOML definitions are validated and compiled into regexes once, at startup.

use crate::error::{PanelError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

const BUILTIN_RULES: &str = include_str!("default_rules.toml");

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw rule table as deserialized from TOML.
/// Compiled into a `RuleSet` before use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDefinition {
    #[serde(default)]
    pub vendor_names: Vec<String>,
    #[serde(default)]
    pub always_show: Vec<String>,
    #[serde(default)]
    pub junk: Vec<String>,
    #[serde(default)]
    pub scrub: Vec<String>,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub relabel: Vec<RelabelDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelabelDef {
    pub pattern: String,
    pub replacement: String,
}

// =============================================================================
// Compiled rules
// =============================================================================

/// One compiled relabel rule.
#[derive(Debug, Clone)]
pub struct Relabel {
    pub pattern: Regex,
    pub replacement: String,
}

/// Compiled rule table. Evaluation order is fixed by the pipeline:
/// always-show overrides junk, junk overrides pass-through.
#[derive(Debug, Clone)]
pub struct RuleSet {
    vendor: Vec<Regex>,
    always_show: Vec<Regex>,
    junk: Vec<Regex>,
    scrub: Vec<Regex>,
    markers: Vec<String>,
    relabel: Vec<Relabel>,
    ansi: Regex,
    generic_tag: Regex,
    warn_tag: Regex,
    timestamps: Vec<Regex>,
    empty_brackets: Regex,
    whitespace: Regex,
}

impl RuleSet {
    /// The rule table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_RULES)
    }

    /// Parse and compile a TOML rule table.
    pub fn from_toml(content: &str) -> Result<Self> {
        let def: RuleDefinition = toml::from_str(content).map_err(|e| PanelError::Rules {
            section: "file",
            pattern: String::new(),
            reason: e.to_string(),
        })?;
        Self::compile(def)
    }

    /// Load a rule table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate a definition and compile every pattern.
    pub fn compile(def: RuleDefinition) -> Result<Self> {
        let vendor = def
            .vendor_names
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| compile_one("vendor_names", &format!("(?i){}", regex::escape(name.trim()))))
            .collect::<Result<Vec<_>>>()?;

        let relabel = def
            .relabel
            .iter()
            .map(|r| {
                Ok(Relabel {
                    pattern: compile_one("relabel", &r.pattern)?,
                    replacement: r.replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vendor,
            always_show: compile_all("always_show", &def.always_show)?,
            junk: compile_all("junk", &def.junk)?,
            scrub: compile_all("scrub", &def.scrub)?,
            markers: def.markers.into_iter().filter(|m| !m.is_empty()).collect(),
            relabel,
            ansi: fixed(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")?,
            generic_tag: fixed(r"(?i)\[(?:log|info|error|debug|success)\]")?,
            warn_tag: fixed(r"(?i)\[warn(?:ing)?\]")?,
            timestamps: vec![
                fixed(r"\[?\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?\]?")?,
                fixed(r"\[?\b\d{1,2}:\d{2}:\d{2}(?:\.\d+)?(?:\s?[AaPp][Mm])?\b\]?")?,
            ],
            empty_brackets: fixed(r"\[\s*\]|\(\s*\)")?,
            whitespace: fixed(r"\s+")?,
        })
    }

    /// Remove terminal color and cursor escape sequences.
    pub fn strip_ansi(&self, line: &str) -> String {
        self.ansi.replace_all(line, "").into_owned()
    }

    /// Blank out every vendor product name, in any letter case.
    /// Repeats until nothing matches: removing "fnlb" from "ffnlbnlb"
    /// leaves another "fnlb".
    pub fn redact(&self, line: &str) -> String {
        let mut out = line.to_string();
        while let Some(re) = self.vendor.iter().find(|re| re.is_match(&out)) {
            out = re.replace_all(&out, "").into_owned();
        }
        out
    }

    /// Drop generic severity tags and embedded timestamps.
    /// Returns the remaining text and whether a warn tag was present.
    pub fn normalize_tags(&self, line: &str) -> (String, bool) {
        let warned = self.warn_tag.is_match(line);
        let mut out = self.warn_tag.replace_all(line, " ").into_owned();
        out = self.generic_tag.replace_all(&out, " ").into_owned();
        for re in &self.timestamps {
            out = re.replace_all(&out, " ").into_owned();
        }
        (out, warned)
    }

    pub fn is_significant(&self, line: &str) -> bool {
        self.always_show.iter().any(|re| re.is_match(line))
    }

    pub fn is_junk(&self, line: &str) -> bool {
        self.junk.iter().any(|re| re.is_match(line))
    }

    /// Cut telemetry fragments out of a line.
    pub fn scrub(&self, line: &str) -> String {
        let mut out = line.to_string();
        for re in &self.scrub {
            out = re.replace_all(&out, " ").into_owned();
        }
        out
    }

    /// Apply the first matching relabel rule, if any.
    pub fn relabel(&self, line: &str) -> String {
        for rule in &self.relabel {
            if rule.pattern.is_match(line) {
                return rule
                    .pattern
                    .replace(line, rule.replacement.as_str())
                    .into_owned();
            }
        }
        line.to_string()
    }

    /// Remove marker glyphs and brackets emptied by redaction, collapse
    /// whitespace and trim.
    pub fn tidy(&self, line: &str) -> String {
        let mut out = line.to_string();
        for marker in &self.markers {
            out = out.replace(marker.as_str(), " ");
        }
        let out = self.empty_brackets.replace_all(&out, " ");
        self.whitespace.replace_all(out.trim(), " ").into_owned()
    }

    /// Summary counts, used by `check-rules`.
    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            vendor_names: self.vendor.len(),
            always_show: self.always_show.len(),
            junk: self.junk.len(),
            scrub: self.scrub.len(),
            markers: self.markers.len(),
            relabel: self.relabel.len(),
        }
    }
}

/// Number of compiled rules per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSummary {
    pub vendor_names: usize,
    pub always_show: usize,
    pub junk: usize,
    pub scrub: usize,
    pub markers: usize,
    pub relabel: usize,
}

fn compile_one(section: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PanelError::Rules {
        section,
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(section: &'static str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_one(section, p)).collect()
}

fn fixed(pattern: &str) -> Result<Regex> {
    compile_one("builtin", pattern)
}
