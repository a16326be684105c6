// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimum-cost perfect matching (Hungarian method with potentials).

/// Assigns each row a distinct column minimizing the summed cost.
///
/// `costs[row][col]` is `None` where the pair is forbidden. Returns the
/// column chosen for every row, or `None` when no perfect matching avoids
/// forbidden pairs. The matrix must be square. Runs in `O(n³)`.
#[allow(clippy::needless_range_loop)]
pub(crate) fn min_cost_assignment(costs: &[Vec<Option<u32>>]) -> Option<Vec<usize>> {
    let n = costs.len();
    if n == 0 {
        return Some(Vec::new());
    }
    if costs.iter().any(|row| row.len() != n) {
        return None;
    }

    // Forbidden pairs cost more than any matching made of allowed pairs.
    let widest = costs
        .iter()
        .flatten()
        .filter_map(|c| *c)
        .max()
        .map_or(0, i64::from);
    let rows = i64::try_from(n).unwrap_or(i64::MAX);
    let forbidden = widest.saturating_add(1).saturating_mul(rows).saturating_add(1);
    let cost = |row: usize, col: usize| costs[row][col].map_or(forbidden, i64::from);

    // 1-based rows/cols; index 0 is the virtual start column.
    let mut row_pot = vec![0_i64; n + 1];
    let mut col_pot = vec![0_i64; n + 1];
    let mut owner = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col0 = 0;
        let mut slack = vec![i64::MAX; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = i64::MAX;
            let mut col1 = 0;
            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = cost(row0 - 1, col - 1) - row_pot[row0] - col_pot[col];
                if reduced < slack[col] {
                    slack[col] = reduced;
                    way[col] = col0;
                }
                if slack[col] < delta {
                    delta = slack[col];
                    col1 = col;
                }
            }
            for col in 0..=n {
                if used[col] {
                    row_pot[owner[col]] += delta;
                    col_pot[col] -= delta;
                } else {
                    slack[col] -= delta;
                }
            }
            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }
        while col0 != 0 {
            let prev = way[col0];
            owner[col0] = owner[prev];
            col0 = prev;
        }
    }

    let mut assignment = vec![0; n];
    for col in 1..=n {
        assignment[owner[col] - 1] = col - 1;
    }
    assignment
        .iter()
        .enumerate()
        .all(|(row, &col)| costs[row][col].is_some())
        .then_some(assignment)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn total(costs: &[Vec<Option<u32>>], assignment: &[usize]) -> u32 {
        assignment
            .iter()
            .enumerate()
            .map(|(r, &c)| costs[r][c].unwrap())
            .sum()
    }

    fn brute_force(costs: &[Vec<Option<u32>>]) -> Option<u32> {
        fn go(costs: &[Vec<Option<u32>>], row: usize, taken: &mut Vec<bool>) -> Option<u32> {
            if row == costs.len() {
                return Some(0);
            }
            let mut best: Option<u32> = None;
            for col in 0..costs.len() {
                if taken[col] {
                    continue;
                }
                let Some(c) = costs[row][col] else { continue };
                taken[col] = true;
                if let Some(rest) = go(costs, row + 1, taken) {
                    best = Some(best.map_or(c + rest, |b| b.min(c + rest)));
                }
                taken[col] = false;
            }
            best
        }
        go(costs, 0, &mut vec![false; costs.len()])
    }

    #[test]
    fn picks_the_cheaper_diagonal() {
        let costs = vec![vec![Some(4), Some(8)], vec![Some(8), Some(4)]];
        assert_eq!(min_cost_assignment(&costs), Some(vec![0, 1]));
    }

    #[test]
    fn routes_around_forbidden_pairs() {
        let costs = vec![
            vec![None, Some(1), Some(9)],
            vec![Some(1), None, Some(9)],
            vec![Some(5), Some(5), Some(0)],
        ];
        let assignment = min_cost_assignment(&costs).unwrap();
        assert_eq!(assignment, vec![1, 0, 2]);
    }

    #[test]
    fn reports_infeasible_matrices() {
        let costs = vec![vec![Some(1), None], vec![Some(1), None]];
        assert_eq!(min_cost_assignment(&costs), None);
        assert_eq!(min_cost_assignment(&[]), Some(vec![]));
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            cells in prop::collection::vec(prop::option::weighted(0.8, 0u32..20), 16),
            n in 1usize..=4,
        ) {
            let costs: Vec<Vec<Option<u32>>> =
                (0..n).map(|r| cells[r * 4..r * 4 + n].to_vec()).collect();
            let expected = brute_force(&costs);
            let found = min_cost_assignment(&costs);
            prop_assert_eq!(found.as_ref().map(|a| total(&costs, a)), expected);
            if let Some(a) = found {
                let mut cols = a.clone();
                cols.sort_unstable();
                cols.dedup();
                prop_assert_eq!(cols.len(), n);
            }
        }
    }
}
