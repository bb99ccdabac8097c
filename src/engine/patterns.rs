//! Over pattern detection.
//!
//! Each over is written as a canonical token sequence, one token per
//! delivery, in the compact scorecard notation (`0`..`6`, `W`, `WD`, `NB2`,
//! `LB1`, ...). Sequences are bucketed by hash and confirmed by comparing
//! the sequences themselves, so a hash collision never merges two overs.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::model::{BallEvent, ExtraKind, InningsSnapshot};

use super::OrderedMap;

/// Length of the ball sequences tracked by [`recurring_sequences`].
pub const SEQUENCE_LEN: usize = 4;

const ROLLING_BASE: u64 = 131;
const ROLLING_MOD: u64 = 1_000_000_007;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateOvers {
    pub pattern: String,
    pub overs: Vec<u32>,
}

/// Canonical token for one delivery.
///
/// Deliveries the compact notation cannot express (a wide or bye with runs
/// off the bat, a no-ball carrying extra byes) fall back to
/// `KIND[extras+bat]`, so distinct deliveries never share a token.
pub fn ball_token(ev: &BallEvent) -> String {
    let bat = ev.runs_off_bat;
    let mut token = match ev.extras {
        None => bat.to_string(),
        Some(extras) => {
            let n = extras.runs;
            match extras.kind {
                ExtraKind::Wide if bat == 0 && n == 1 => "WD".to_string(),
                ExtraKind::Wide if bat == 0 && n > 1 => format!("WD{}", n - 1),
                ExtraKind::NoBall if n == 1 && bat == 0 => "NB".to_string(),
                ExtraKind::NoBall if n == 1 => format!("NB{}", bat),
                ExtraKind::LegBye if bat == 0 => format!("LB{}", n),
                ExtraKind::Bye if bat == 0 => format!("B{}", n),
                ExtraKind::Penalty if bat == 0 => format!("P{}", n),
                kind => format!("{}[{}+{}]", extra_prefix(kind), n, bat),
            }
        }
    };
    if ev.wicket.is_some() {
        token = if token == "0" { "W".to_string() } else { format!("{}W", token) };
    }
    token
}

fn extra_prefix(kind: ExtraKind) -> &'static str {
    match kind {
        ExtraKind::Wide => "WD",
        ExtraKind::NoBall => "NB",
        ExtraKind::LegBye => "LB",
        ExtraKind::Bye => "B",
        ExtraKind::Penalty => "P",
    }
}

/// Over number and canonical signature of every over, in order.
pub fn over_signatures(innings: &InningsSnapshot) -> Vec<(u32, String)> {
    let mut out: Vec<(u32, Vec<String>)> = Vec::new();
    for ev in &innings.events {
        match out.last_mut() {
            Some((over, tokens)) if *over == ev.over => tokens.push(ball_token(ev)),
            _ => out.push((ev.over, vec![ball_token(ev)])),
        }
    }
    out.into_iter()
        .map(|(over, tokens)| (over, tokens.join(",")))
        .collect()
}

fn hash_of(sig: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    sig.hash(&mut hasher);
    hasher.finish()
}

/// Exact-match groups of overs, ordered by first appearance.
fn exact_groups(innings: &InningsSnapshot) -> Vec<(String, Vec<u32>)> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut groups: Vec<(String, Vec<u32>)> = Vec::new();
    for (over, sig) in over_signatures(innings) {
        let bucket = buckets.entry(hash_of(&sig)).or_default();
        let found = bucket.iter().copied().find(|&g| groups[g].0 == sig);
        match found {
            Some(g) => groups[g].1.push(over),
            None => {
                bucket.push(groups.len());
                groups.push((sig, vec![over]));
            }
        }
    }
    groups
}

/// Over signatures bowled at least twice → repeat count, most frequent first.
pub fn scoring_patterns(innings: &InningsSnapshot) -> OrderedMap<u32> {
    let mut repeated: Vec<_> = exact_groups(innings)
        .into_iter()
        .filter(|(_, overs)| overs.len() >= 2)
        .collect();
    // stable: equal counts keep first-appearance order
    repeated.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    repeated
        .into_iter()
        .map(|(sig, overs)| (sig, overs.len() as u32))
        .collect()
}

/// Groups of overs with identical ball-by-ball sequences.
pub fn duplicate_overs(innings: &InningsSnapshot) -> Vec<DuplicateOvers> {
    exact_groups(innings)
        .into_iter()
        .filter(|(_, overs)| overs.len() >= 2)
        .map(|(pattern, overs)| DuplicateOvers { pattern, overs })
        .collect()
}

/// Overs sharing the same runs and wickets profile, labelled
/// `"<runs> runs, <wickets> wickets"`. Largest groups first.
pub fn similar_overs(innings: &InningsSnapshot) -> OrderedMap<Vec<u32>> {
    let mut groups: Vec<((u32, u32), Vec<u32>)> = Vec::new();
    for o in &innings.overs {
        let key = (o.runs, o.wickets);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, overs)) => overs.push(o.over),
            None => groups.push((key, vec![o.over])),
        }
    }
    groups.retain(|(_, overs)| overs.len() >= 2);
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups
        .into_iter()
        .map(|((runs, wickets), overs)| (format!("{} runs, {} wickets", runs, wickets), overs))
        .collect()
}

/// Ball sequences of [`SEQUENCE_LEN`] that recur anywhere in the innings.
///
/// Windows slide one ball at a time across over boundaries and are hashed
/// with a polynomial rolling hash; candidate matches are confirmed token by
/// token. Returns sequence → occurrences for sequences seen more than once,
/// most frequent first.
pub fn recurring_sequences(innings: &InningsSnapshot) -> OrderedMap<u32> {
    let tokens: Vec<String> = innings.events.iter().map(ball_token).collect();
    let k = SEQUENCE_LEN;
    if tokens.len() < k {
        return OrderedMap::default();
    }

    let mut ids: HashMap<&str, u64> = HashMap::new();
    let codes: Vec<u64> = tokens
        .iter()
        .map(|t| {
            let next = ids.len() as u64 + 1;
            *ids.entry(t.as_str()).or_insert(next)
        })
        .collect();

    let mut high = 1u64;
    for _ in 1..k {
        high = high * ROLLING_BASE % ROLLING_MOD;
    }

    let mut hash = codes[..k]
        .iter()
        .fold(0u64, |h, &c| (h * ROLLING_BASE + c) % ROLLING_MOD);

    // hash → indices into `seen`; seen holds (window start, count)
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut seen: Vec<(usize, u32)> = Vec::new();
    for start in 0..=tokens.len() - k {
        if start > 0 {
            let out = codes[start - 1] * high % ROLLING_MOD;
            hash = (hash + ROLLING_MOD - out) % ROLLING_MOD;
            hash = (hash * ROLLING_BASE + codes[start + k - 1]) % ROLLING_MOD;
        }
        let window = &codes[start..start + k];
        let bucket = buckets.entry(hash).or_default();
        let found = bucket
            .iter()
            .copied()
            .find(|&i| &codes[seen[i].0..seen[i].0 + k] == window);
        match found {
            Some(i) => seen[i].1 += 1,
            None => {
                bucket.push(seen.len());
                seen.push((start, 1));
            }
        }
    }

    seen.retain(|(_, count)| *count >= 2);
    seen.sort_by(|a, b| b.1.cmp(&a.1));
    seen.into_iter()
        .map(|(start, count)| (tokens[start..start + k].join(","), count))
        .collect()
}
