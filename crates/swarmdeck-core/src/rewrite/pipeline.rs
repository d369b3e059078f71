// ABOUTME: Turns raw swarm client output into timestamped display lines.
// ABOUTME: Per line: strip ANSI, redact, normalize tags, classify junk, relabel, tidy, stamp.

use super::rules::RuleSet;
use chrono::{Local, NaiveTime};

/// Outcome of classifying a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Shown; carries the rewritten text without timestamp.
    Show(String),
    /// Matched junk and nothing significant.
    Suppressed,
    /// Nothing left after cleanup.
    Empty,
}

/// The rewrite pipeline. Stateless apart from the compiled rules.
#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: RuleSet,
}

impl Pipeline {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrite a raw blob using the local wall clock for timestamps.
    pub fn process(&self, raw: &str) -> Vec<String> {
        self.process_at(raw, Local::now().time())
    }

    /// Rewrite a raw blob, stamping each surviving line with `now`.
    pub fn process_at(&self, raw: &str, now: NaiveTime) -> Vec<String> {
        let stamp = now.format("%H:%M:%S").to_string();
        // Progress output redraws with a bare '\r', which counts as a break too.
        raw.split(['\r', '\n'])
            .filter_map(|line| match self.classify(line) {
                Verdict::Show(text) => Some(format!("{stamp} {text}")),
                Verdict::Suppressed | Verdict::Empty => None,
            })
            .collect()
    }

    /// Run one physical line through every rewrite stage.
    pub fn classify(&self, line: &str) -> Verdict {
        if line.trim().is_empty() {
            return Verdict::Empty;
        }

        let text = self.rules.strip_ansi(line);
        let text = self.rules.redact(&text);

        // Significance is judged while severity tags are still present.
        let significant = self.rules.is_significant(&text);

        let (text, warned) = self.rules.normalize_tags(&text);

        let text = if self.rules.is_junk(&text) {
            if !significant {
                return Verdict::Suppressed;
            }
            self.rules.scrub(&text)
        } else {
            text
        };

        let text = self.rules.relabel(&text);
        let text = self.rules.tidy(&text);
        if text.is_empty() {
            return Verdict::Empty;
        }

        if warned {
            Verdict::Show(format!("[WARN] {text}"))
        } else {
            Verdict::Show(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::new(RuleSet::builtin().unwrap())
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 5).unwrap()
    }

    #[test]
    fn error_line_survives_junk_and_loses_vendor() {
        let out = pipeline().process_at("[ERROR] fnlb connection failed ua: xyz", noon());
        assert_eq!(out, vec!["12:00:05 connection failed".to_string()]);
    }

    #[test]
    fn download_chatter_is_suppressed() {
        assert!(pipeline().process_at("Downloaded 42 BN", noon()).is_empty());
    }

    #[test]
    fn blank_lines_produce_nothing() {
        let p = pipeline();
        assert!(p.process_at("", noon()).is_empty());
        assert!(p.process_at("   \t  ", noon()).is_empty());
        assert!(p.process_at("\n\n  \r\n", noon()).is_empty());
    }

    #[test]
    fn multi_line_blob_is_split() {
        let out = pipeline().process_at(
            "starting shard with ID: a1\nDownloaded 10 BN\n\n3 shard bots added to client",
            noon(),
        );
        assert_eq!(
            out,
            vec![
                "12:00:05 starting bot with ID: [a1]".to_string(),
                "12:00:05 3 bots added".to_string(),
            ]
        );
    }

    #[test]
    fn warn_tag_is_kept_in_fixed_form() {
        let out = pipeline().process_at("[warning] [FNLB] slow shard", noon());
        assert_eq!(out, vec!["12:00:05 [WARN] slow shard".to_string()]);
    }

    #[test]
    fn embedded_timestamp_replaced_by_ours() {
        let out = pipeline().process_at("[09:15:00] [INFO] ✔ cluster: bob, categories: 2", noon());
        assert_eq!(out, vec!["12:00:05 user bob is using 2 slot(s)".to_string()]);
    }

    #[test]
    fn vendor_only_line_is_empty() {
        assert_eq!(pipeline().classify("\x1b[31mFNLB\x1b[0m"), Verdict::Empty);
    }

    #[test]
    fn vendor_never_survives_any_case() {
        let p = pipeline();
        for input in [
            "fnlb ready",
            "FNLB ready!",
            "using FnLb v2 error",
            "prefix-fNlB-suffix",
            "[WARN] fnlbfnlb",
            "ffnlbnlb ready",
            "fnFnLbLb",
            "fffnlbnlbnlb error",
        ] {
            for line in p.process_at(input, noon()) {
                assert!(
                    !line.to_lowercase().contains("fnlb"),
                    "vendor leaked in {line:?}"
                );
            }
        }
    }

    #[test]
    fn carriage_return_splits_lines() {
        let p = pipeline();
        let out = p.process_at("Downloading 10%\rconnected ok", noon());
        assert_eq!(out, vec!["12:00:05 connected ok".to_string()]);

        let out = p.process_at("first\r\nsecond\rthird\n", noon());
        assert_eq!(
            out,
            vec![
                "12:00:05 first".to_string(),
                "12:00:05 second".to_string(),
                "12:00:05 third".to_string(),
            ]
        );
    }

    #[test]
    fn significant_junk_is_shown() {
        let p = pipeline();
        for input in [
            r#"{"error": "boom"}"#,
            "Downloaded 5 files!",
            "[!] progress stalled",
            "warn: heap: 900",
        ] {
            assert!(
                matches!(p.classify(input), Verdict::Show(_)),
                "{input} should be shown"
            );
        }
    }

    #[test]
    fn plain_junk_is_suppressed() {
        let p = pipeline();
        for input in [r#"{"shard": 1}"#, "}", "Downloading assets", "uploaded 50%", "total: 12"] {
            assert_eq!(p.classify(input), Verdict::Suppressed, "{input}");
        }
    }

    #[test]
    fn unmatched_lines_pass_through() {
        assert_eq!(
            pipeline().classify("  ℹ️  bot joined   the party "),
            Verdict::Show("bot joined the party".to_string())
        );
    }
}
