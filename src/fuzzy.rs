/*!
Weighted Damerau-Levenshtein distance and "did you mean" suggestions.

Costs: adjacent transposition 0, insertion 1, substitution 2, deletion 3.
Names reachable by swapping or adding characters to what the user typed
score best.
*/

/// Per-operation costs used by [`damerau_levenshtein`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCosts {
    pub swap: usize,
    pub substitution: usize,
    pub insertion: usize,
    pub deletion: usize,
}

impl EditCosts {
    /// Cost table used for command suggestions.
    pub const SUGGESTION: EditCosts = EditCosts {
        swap: 0,
        substitution: 2,
        insertion: 1,
        deletion: 3,
    };
}

impl Default for EditCosts {
    fn default() -> Self {
        Self::SUGGESTION
    }
}

/// Distance between `s1` and `s2` under `costs`, keeping only three rows of
/// the DP matrix (`row0` two rows back, `row1` previous, `row2` current).
pub fn damerau_levenshtein(s1: &str, s2: &str, costs: &EditCosts) -> usize {
    if s1 == s2 {
        return 0;
    }
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len() * costs.insertion;
    }
    if b.is_empty() {
        return a.len() * costs.deletion;
    }

    let mut row1: Vec<usize> = (0..=b.len()).map(|j| j * costs.insertion).collect();
    let mut row2 = row1.clone();
    let mut row0 = row1.clone();

    for i in 0..a.len() {
        row2[0] = (i + 1) * costs.deletion;
        for j in 0..b.len() {
            let substitution = row1[j] + if a[i] != b[j] { costs.substitution } else { 0 };
            let insertion = row2[j] + costs.insertion;
            let deletion = row1[j + 1] + costs.deletion;
            let mut best = substitution.min(insertion).min(deletion);
            if i > 0 && j > 0 && a[i - 1] == b[j] && a[i] == b[j - 1] {
                best = best.min(row0[j - 1] + costs.swap);
            }
            row2[j + 1] = best;
        }
        // row0 <- row1 <- row2, the old row0 becomes scratch for the next pass
        std::mem::swap(&mut row0, &mut row1);
        std::mem::swap(&mut row1, &mut row2);
    }

    row1[b.len()]
}

/// Suggest registered names close to `cmd`.
///
/// A name that starts with `cmd` scores 0. Any other name scores the
/// distance from `cmd` to its first `separator`-delimited segment, plus one.
/// All names tied at the best score are returned, sorted by name. Names
/// from the next-best tier are never appended, even after prefix matches.
pub fn fuzzy_matches<I, S>(cmd: &str, names: I, separator: char) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    candidates.sort();

    let mut scored: Vec<(usize, String)> = candidates
        .into_iter()
        .map(|candidate| {
            let distance = if candidate.starts_with(cmd) {
                0
            } else {
                let prefix = candidate.split(separator).next().unwrap_or("");
                damerau_levenshtein(cmd, prefix, &EditCosts::SUGGESTION) + 1
            };
            (distance, candidate)
        })
        .collect();
    scored.sort();

    let Some(best) = scored.first().map(|(d, _)| *d) else {
        return Vec::new();
    };
    scored
        .into_iter()
        .take_while(|(d, _)| *d == best)
        .map(|(_, name)| name)
        .collect()
}
