use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("candidate {id} has {found} dimensions, query has {expected}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        id: String,
    },
}

/// One ranked candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match<I> {
    pub id: I,
    pub score: f32,
}

/// Cosine similarity of two equally sized vectors.
///
/// Returns exactly `0.0` when either side has zero magnitude. Accumulates in
/// f64 and takes a single square root of the product of squared norms, so a
/// vector compared with itself scores exactly `1.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b).sqrt();
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}

/// Brute-force top-k by cosine similarity.
///
/// `k == 0` or an empty candidate set yields an empty result. Otherwise every
/// candidate must have the query's dimensionality; the check runs over the
/// whole set before any scoring, so a mismatch never yields a partial result.
/// Ties keep their input order.
pub fn rank<I, V>(
    query: &[f32],
    candidates: &[(I, V)],
    k: usize,
) -> Result<Vec<Match<I>>, SimilarityError>
where
    I: Clone + fmt::Display,
    V: AsRef<[f32]>,
{
    if k == 0 || candidates.is_empty() {
        return Ok(Vec::new());
    }

    let expected = query.len();
    if let Some((id, v)) = candidates
        .iter()
        .find(|(_, v)| v.as_ref().len() != expected)
    {
        return Err(SimilarityError::DimensionMismatch {
            expected,
            found: v.as_ref().len(),
            id: id.to_string(),
        });
    }

    let mut scored: Vec<Match<I>> = candidates
        .iter()
        .map(|(id, v)| Match {
            id: id.clone(),
            score: cosine_similarity(query, v.as_ref()),
        })
        .collect();

    // `sort_by` is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_scenario_top_two() {
        let candidates: Vec<(&str, Vec<f32>)> = vec![
            ("A", vec![1.0, 0.0]),
            ("B", vec![0.0, 1.0]),
            ("C", vec![0.7, 0.7]),
        ];
        let ranked = rank(&[1.0, 0.0], &candidates, 2).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "A");
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].id, "C");
        assert!(approx(ranked[1].score, 0.70710677));
    }

    #[test]
    fn test_output_length_is_min_of_k_and_candidates() {
        let candidates: Vec<(u32, Vec<f32>)> =
            (0..7).map(|i| (i, vec![i as f32, 1.0, -2.0])).collect();
        for k in 0..10 {
            let ranked = rank(&[0.3, 0.2, 0.1], &candidates, k).unwrap();
            assert_eq!(ranked.len(), k.min(candidates.len()));
        }
    }

    #[test]
    fn test_scores_non_increasing_and_bounded() {
        let candidates: Vec<(usize, Vec<f32>)> = (0..50)
            .map(|i| {
                let t = i as f32 * 0.37;
                (i, vec![t.sin(), t.cos(), (t * 2.0).sin() - 0.5, 1.0 - t.cos()])
            })
            .collect();
        let ranked = rank(&[0.2, -0.4, 0.9, 0.1], &candidates, 50).unwrap();

        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for m in &ranked {
            assert!((-1.0..=1.0).contains(&m.score));
        }
    }

    #[test]
    fn test_zero_k_and_empty_candidates() {
        let candidates: Vec<(i32, Vec<f32>)> = vec![(1, vec![1.0, 2.0])];
        assert!(rank(&[1.0, 2.0], &candidates, 0).unwrap().is_empty());

        let none: Vec<(i32, Vec<f32>)> = Vec::new();
        assert!(rank(&[1.0, 2.0], &none, 5).unwrap().is_empty());
        assert!(rank(&[1.0, 2.0], &none, 0).unwrap().is_empty());
    }

    #[test]
    fn test_self_similarity_is_exactly_one() {
        let vectors: [Vec<f32>; 4] = [
            vec![1.0, 0.0],
            vec![0.1, 0.2, 0.3, 0.4, 0.5],
            vec![-3.5, 12.25, 0.001, 7.0],
            vec![1e-3; 384],
        ];
        for v in vectors {
            let ranked = rank(&v, &[(42, v.clone())], 1).unwrap();
            assert_eq!(ranked, vec![Match { id: 42, score: 1.0 }]);
        }
    }

    #[test]
    fn test_zero_vectors_score_zero() {
        let candidates: Vec<(i32, Vec<f32>)> =
            vec![(1, vec![0.0, 0.0, 0.0]), (2, vec![1.0, 1.0, 1.0])];
        let ranked = rank(&[1.0, 2.0, 3.0], &candidates, 2).unwrap();
        let zero = ranked.iter().find(|m| m.id == 1).unwrap();
        assert_eq!(zero.score, 0.0);

        // zero query
        let ranked = rank(&[0.0, 0.0, 0.0], &candidates, 2).unwrap();
        assert!(ranked.iter().all(|m| m.score == 0.0 && m.score.is_finite()));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates: Vec<(&str, Vec<f32>)> = vec![
            ("first", vec![2.0, 0.0]),
            ("up", vec![0.0, 1.0]),
            ("second", vec![4.0, 0.0]),
            ("third", vec![0.5, 0.0]),
        ];
        let ranked = rank(&[1.0, 1.0], &candidates, 4).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|m| m.id).collect();

        // every candidate sits at 45 degrees from the query
        assert_eq!(ids, vec!["first", "up", "second", "third"]);
    }

    #[test]
    fn test_dimension_mismatch_fails_whole_call() {
        let candidates: Vec<(i32, Vec<f32>)> = vec![(1, vec![1.0, 0.0]), (2, vec![1.0, 0.0, 0.0])];
        let err = rank(&[1.0, 0.0], &candidates, 1).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::DimensionMismatch {
                expected: 2,
                found: 3,
                id: "2".to_string()
            }
        );
    }

    #[test]
    fn test_zero_k_short_circuits_before_validation() {
        let candidates: Vec<(i32, Vec<f32>)> = vec![(1, vec![1.0])];
        assert!(rank(&[1.0, 0.0], &candidates, 0).unwrap().is_empty());
    }

    #[test]
    fn test_opposite_vectors() {
        let candidates: Vec<(i32, Vec<f32>)> = vec![(0, vec![-1.0, -2.0])];
        let ranked = rank(&[1.0, 2.0], &candidates, 1).unwrap();
        assert_eq!(ranked[0].score, -1.0);
    }
}
