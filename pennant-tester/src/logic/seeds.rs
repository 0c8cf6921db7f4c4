use anyhow::{Context, Result, bail};
use pennant_game::seed::{fold_seed, parse_seed};
use regex::Regex;
use std::collections::HashSet;

const DEFAULT_SEED: u32 = 1337;
const MAX_RANGE_LEN: u64 = 100_000;

/// Resolve CLI seed tokens into game seeds, in order and without duplicates.
///
/// Accepts decimal or `0x` hex literals and inclusive/exclusive ranges
/// (`1..10`, `1..=10`). Seeds wider than 32 bits are folded.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u32>> {
    let range = Regex::new(r"^(\w+)\.\.(=?)(\w+)$").context("compiling seed range pattern")?;
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let expanded = if let Some(caps) = range.captures(token) {
            let start = parse_token(&caps[1])?;
            let inclusive = !caps[2].is_empty();
            let end = parse_token(&caps[3])?;
            let end = if inclusive { end.saturating_add(1) } else { end };
            if end <= start {
                bail!("Empty seed range: {token}");
            }
            if end - start > MAX_RANGE_LEN {
                bail!("Seed range too long ({} seeds): {token}", end - start);
            }
            (start..end).map(fold_seed).collect()
        } else {
            vec![fold_seed(parse_token(token)?)]
        };

        for seed in expanded {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<u64> {
    parse_seed(token).with_context(|| format!("Unrecognized seed token: {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_literals_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "0x10", "3..6", "5..=7"])).unwrap();
        assert_eq!(seeds, vec![42, 16, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn falls_back_to_default_seed() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_garbage_and_empty_ranges() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..999999999"])).is_err());
    }

    #[test]
    fn wide_seeds_are_folded() {
        let wide = 0x0000_0001_0000_0002_u64;
        let raw = wide.to_string();
        let seeds = resolve_seed_inputs(&tokens(&[raw.as_str()])).unwrap();
        assert_eq!(seeds, vec![3]);
    }
}
