//! Edit distance used to rank matching templates.

/// Returns the Levenshtein distance between `a` and `b`.
///
/// Insertions, deletions and substitutions all cost one. Distances are
/// counted in `char`s, not bytes.
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let rows = a_chars.len() + 1;
    let cols = b_chars.len() + 1;

    let mut table = vec![vec![0usize; cols]; rows];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in table[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 0..a_chars.len() {
        for j in 0..b_chars.len() {
            table[i + 1][j + 1] = if a_chars[i] == b_chars[j] {
                table[i][j]
            } else {
                let deletion = table[i][j + 1];
                let insertion = table[i + 1][j];
                let substitution = table[i][j];
                1 + deletion.min(insertion).min(substitution)
            };
        }
    }

    table[a_chars.len()][b_chars.len()]
}
