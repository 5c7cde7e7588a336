//! Engine configuration string parser.
//!
//! Mirrors Pachi's own two-tier configuration: `clap` parses the process's
//! command line (board size, subcommand), while this module parses the
//! comma-separated `key[=value]` engine string the command surface accepts
//! (the same shape `playout/elo.c`'s `playout_elo_init` parses its own
//! colon-separated options with: split on the separator, then on `=`,
//! reject anything unrecognized).

use crate::error::EngineError;
use crate::mcts::ThreadModel;

/// Parsed engine configuration, with every key from the external-interfaces
/// configuration-string table.
///
/// Most keys beyond the core search parameters (`pondering`, `playout=`,
/// `policy=`, `random_policy`/`random_policy_chance`, `prior=`, `dynkomi`/
/// `dynkomi_mask`, `val_scale`/`val_points`/`val_extra`, `no_book`,
/// `pass_all_alive`) are accepted and stored but do not yet change search
/// behavior - see DESIGN.md's Open Questions for which ones remain no-ops.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub threads: usize,
    pub thread_model: ThreadModel,
    pub max_tree_size_mib: usize,
    pub resign_ratio: f32,
    pub debug_level: u32,
    pub komi: f32,
    pub pondering: bool,
    pub playout: String,
    pub policy: String,
    pub random_policy: Option<String>,
    pub random_policy_chance: u32,
    pub prior: Option<String>,
    pub fuseki_end: u32,
    pub yose_start: u32,
    pub dynkomi: i32,
    pub dynkomi_mask: String,
    pub val_scale: f64,
    pub val_points: u32,
    pub val_extra: bool,
    pub mercy: u32,
    pub gamelen: usize,
    pub expand_p: u32,
    pub force_seed: Option<u64>,
    pub no_book: bool,
    pub pass_all_alive: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threads: crate::constants::DEFAULT_THREADS,
            thread_model: ThreadModel::TreeVirtualLoss,
            max_tree_size_mib: crate::constants::DEFAULT_MAX_TREE_SIZE_MIB,
            resign_ratio: crate::constants::RESIGN_RATIO,
            debug_level: 0,
            komi: 7.5,
            pondering: false,
            playout: "elo".to_string(),
            policy: "ucb1amaf".to_string(),
            random_policy: None,
            random_policy_chance: 0,
            prior: None,
            fuseki_end: crate::constants::FUSEKI_END_PERCENT,
            yose_start: crate::constants::YOSE_START_PERCENT,
            dynkomi: 0,
            dynkomi_mask: "black".to_string(),
            val_scale: 0.0,
            val_points: 40,
            val_extra: true,
            mercy: crate::constants::MERCY_THRESHOLD,
            gamelen: crate::constants::DEFAULT_GAMELEN,
            expand_p: crate::constants::EXPAND_VISITS,
            force_seed: None,
            no_book: false,
            pass_all_alive: false,
        }
    }
}

impl EngineConfig {
    /// Apply a comma-separated `key=value,key=value` string on top of the
    /// current configuration, erroring on the first unrecognized key or
    /// unparsable value.
    pub fn apply(&mut self, config_str: &str) -> Result<(), EngineError> {
        for entry in config_str.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            self.apply_one(entry)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, entry: &str) -> Result<(), EngineError> {
        let (key, value) = match entry.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (entry.trim(), None),
        };

        match key {
            "threads" => self.threads = parse_value(key, value)?,
            "thread_model" => {
                self.thread_model = match value {
                    Some("root") => ThreadModel::Root,
                    Some("tree") => ThreadModel::Tree,
                    Some("treevl") => ThreadModel::TreeVirtualLoss,
                    _ => return Err(EngineError::Config(format!("bad thread_model value for '{key}'"))),
                };
            }
            "max_tree_size" => self.max_tree_size_mib = parse_value(key, value)?,
            "resign_ratio" => self.resign_ratio = parse_value(key, value)?,
            "debug" => {
                self.debug_level = match value {
                    Some(v) => parse_value::<u32>(key, Some(v))?,
                    None => self.debug_level + 1,
                };
            }
            "komi" => self.komi = parse_value(key, value)?,
            "pondering" => {
                self.pondering = match value {
                    Some(v) => v != "0",
                    None => true,
                };
            }
            "playout" => self.playout = require_value(key, value)?.to_string(),
            "policy" => self.policy = require_value(key, value)?.to_string(),
            "random_policy" => self.random_policy = Some(require_value(key, value)?.to_string()),
            "random_policy_chance" => self.random_policy_chance = parse_value(key, value)?,
            "prior" => self.prior = Some(require_value(key, value)?.to_string()),
            "fuseki_end" => self.fuseki_end = parse_value(key, value)?,
            "yose_start" => self.yose_start = parse_value(key, value)?,
            "dynkomi" => self.dynkomi = parse_value(key, value)?,
            "dynkomi_mask" => self.dynkomi_mask = require_value(key, value)?.to_string(),
            "val_scale" => self.val_scale = parse_value(key, value)?,
            "val_points" => self.val_points = parse_value(key, value)?,
            "val_extra" => {
                self.val_extra = match value {
                    Some(v) => v != "0",
                    None => true,
                };
            }
            "mercy" => self.mercy = parse_value(key, value)?,
            "gamelen" => self.gamelen = parse_value(key, value)?,
            "expand_p" => self.expand_p = parse_value(key, value)?,
            "force_seed" => self.force_seed = Some(parse_value(key, value)?),
            "no_book" => self.no_book = true,
            "pass_all_alive" => self.pass_all_alive = true,
            other => return Err(EngineError::Config(format!("unknown key '{other}'"))),
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: Option<&str>) -> Result<T, EngineError> {
    value
        .ok_or_else(|| EngineError::Config(format!("key '{key}' requires a value")))?
        .parse()
        .map_err(|_| EngineError::Config(format!("key '{key}' has an invalid value")))
}

fn require_value<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str, EngineError> {
    value.ok_or_else(|| EngineError::Config(format!("key '{key}' requires a value")))
}

/// Log a message to stderr, gated on the configured debug level —
/// plain `eprintln!`-based diagnostics rather than pulling in the
/// `log`/`tracing` crates.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $cfg:expr, $($arg:tt)*) => {
        if $cfg.debug_level >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let mut cfg = EngineConfig::default();
        cfg.apply("threads=4,resign_ratio=0.15,debug=2").unwrap();
        assert_eq!(cfg.threads, 4);
        assert!((cfg.resign_ratio - 0.15).abs() < 1e-6);
        assert_eq!(cfg.debug_level, 2);
    }

    #[test]
    fn rejects_unknown_key() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.apply("not_a_real_key=1").is_err());
    }

    #[test]
    fn rejects_missing_value() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.apply("threads").is_err());
    }

    #[test]
    fn thread_model_accepts_treevl_not_tree_vl() {
        let mut cfg = EngineConfig::default();
        cfg.apply("thread_model=treevl").unwrap();
        assert_eq!(cfg.thread_model, ThreadModel::TreeVirtualLoss);

        cfg.apply("thread_model=tree").unwrap();
        assert_eq!(cfg.thread_model, ThreadModel::Tree);

        cfg.apply("thread_model=root").unwrap();
        assert_eq!(cfg.thread_model, ThreadModel::Root);

        let mut bad = EngineConfig::default();
        assert!(bad.apply("thread_model=tree_vl").is_err());
    }

    #[test]
    fn accepts_the_full_documented_key_set() {
        let mut cfg = EngineConfig::default();
        cfg.apply(concat!(
            "pondering,playout=elo,policy=ucb1amaf,random_policy=regular,",
            "random_policy_chance=40,prior=eye,fuseki_end=20,yose_start=85,",
            "dynkomi=15,dynkomi_mask=black,val_scale=0.1,val_points=40,",
            "val_extra=0,mercy=25,gamelen=1000,expand_p=8,force_seed=42,",
            "no_book,pass_all_alive"
        ))
        .unwrap();

        assert!(cfg.pondering);
        assert_eq!(cfg.playout, "elo");
        assert_eq!(cfg.policy, "ucb1amaf");
        assert_eq!(cfg.random_policy.as_deref(), Some("regular"));
        assert_eq!(cfg.random_policy_chance, 40);
        assert_eq!(cfg.prior.as_deref(), Some("eye"));
        assert_eq!(cfg.fuseki_end, 20);
        assert_eq!(cfg.yose_start, 85);
        assert_eq!(cfg.dynkomi, 15);
        assert_eq!(cfg.dynkomi_mask, "black");
        assert!((cfg.val_scale - 0.1).abs() < 1e-9);
        assert_eq!(cfg.val_points, 40);
        assert!(!cfg.val_extra);
        assert_eq!(cfg.mercy, 25);
        assert_eq!(cfg.gamelen, 1000);
        assert_eq!(cfg.expand_p, 8);
        assert_eq!(cfg.force_seed, Some(42));
        assert!(cfg.no_book);
        assert!(cfg.pass_all_alive);
    }
}
