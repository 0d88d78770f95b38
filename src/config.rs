//! Runtime configuration for synchronization calls.

use clap::Parser;
use sync_core::{DefaultTable, EnumDecodePolicy};

/// Command-line and environment options shared by the CLI subcommands.
#[derive(Parser, Clone, Debug, Default)]
pub struct SyncOpts {
    /// Fail the call when an enum option string is not valid JSON
    #[arg(long, env = "RECORD_SYNC_STRICT_OPTIONS")]
    pub strict_options: bool,

    /// Fields that are never default-filled (repeatable, or comma-separated in env)
    #[arg(
        long = "ignore-field",
        value_name = "FIELD",
        env = "RECORD_SYNC_IGNORE_FIELDS",
        value_delimiter = ','
    )]
    pub ignore_fields: Vec<String>,

    /// Dry run mode - validate and fill, but don't write records
    #[arg(long, env = "RECORD_SYNC_DRY_RUN")]
    pub dry_run: bool,
}

/// Settings applied to every call made through one manager.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub enum_decode_policy: EnumDecodePolicy,

    /// Merged with each request's own ignore list
    pub default_ignore_fields: Vec<String>,

    /// Per-type default policies used by the filler
    pub default_table: DefaultTable,

    /// Forces dry-run for all requests
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn with_enum_decode_policy(mut self, policy: EnumDecodePolicy) -> Self {
        self.enum_decode_policy = policy;
        self
    }

    pub fn with_ignore_fields(mut self, fields: Vec<String>) -> Self {
        self.default_ignore_fields = fields;
        self
    }

    pub fn with_default_table(mut self, table: DefaultTable) -> Self {
        self.default_table = table;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl From<&SyncOpts> for SyncConfig {
    fn from(opts: &SyncOpts) -> Self {
        let enum_decode_policy = if opts.strict_options {
            EnumDecodePolicy::Strict
        } else {
            EnumDecodePolicy::Lenient
        };
        Self {
            enum_decode_policy,
            default_ignore_fields: opts
                .ignore_fields
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            default_table: DefaultTable::standard(),
            dry_run: opts.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_lenient() {
        let config = SyncConfig::default();
        assert_eq!(config.enum_decode_policy, EnumDecodePolicy::Lenient);
        assert!(config.default_ignore_fields.is_empty());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_from_opts() {
        let opts = SyncOpts::try_parse_from([
            "record-sync",
            "--strict-options",
            "--ignore-field",
            "bk_cpu",
            "--ignore-field",
            " bk_mem ",
            "--dry-run",
        ])
        .unwrap();

        let config = SyncConfig::from(&opts);
        assert_eq!(config.enum_decode_policy, EnumDecodePolicy::Strict);
        assert_eq!(config.default_ignore_fields, vec!["bk_cpu", "bk_mem"]);
        assert!(config.dry_run);
    }

    #[test]
    fn test_comma_separated_ignore_fields() {
        let opts =
            SyncOpts::try_parse_from(["record-sync", "--ignore-field", "a,b,,c"]).unwrap();
        let config = SyncConfig::from(&opts);
        assert_eq!(config.default_ignore_fields, vec!["a", "b", "c"]);
        assert_eq!(config.enum_decode_policy, EnumDecodePolicy::Lenient);
    }
}
