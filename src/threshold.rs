//! Deriving per-rank clustering thresholds from an annotated tree.
//!
//! For every pair of adjacent ranks (e.g. family and genus), sister clades of
//! the finer rank below a common clade of the coarser rank are collected as
//! [CladeDistance] examples. The median distance per rank transition is then
//! turned into a monotonically non-increasing sequence of thresholds, see
//! [ThresholdFinder::find_thresholds].

use crate::error::{Result, Tree2TaxError};
use crate::model::{PhyloTree, VertexIndex};
use crate::taxonomy::has_rank;
use std::collections::HashSet;
use tracing::{debug, info, warn};

// =#========================================================================#=
// CLADE DISTANCE
// =#========================================================================#=
/// Distance between the two most remote tips of two sister clades of the same
/// rank, both below a common clade of the next coarser rank.
#[derive(Debug, Clone, PartialEq)]
pub struct CladeDistance {
    /// Vertex annotated with the coarser rank
    pub parent_node: VertexIndex,
    /// First vertex annotated with the finer rank
    pub daughter_node1: VertexIndex,
    /// Second vertex annotated with the finer rank
    pub daughter_node2: VertexIndex,
    /// Tree distance between the two clades, including the spread within each
    pub distance: f64,
}

// =#========================================================================#=
// THRESHOLD FINDER
// =#========================================================================#=
/// Finds tree distance thresholds separating taxonomic ranks of an annotated
/// tree.
///
/// # Example
/// ```
/// use tree2tax::newick::parse_str;
/// use tree2tax::threshold::ThresholdFinder;
///
/// let tree = parse_str("(((A:1,B:2)'g__genus1':3,(C:4,D:5)'g__genus2':6)'f__family':10)root;")?;
/// let examples = ThresholdFinder::new(&tree).find_examples("f", "g")?;
/// assert_eq!(examples.len(), 1);
/// assert_eq!(examples[0].distance, 16.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ThresholdFinder<'a> {
    tree: &'a PhyloTree,
}

impl<'a> ThresholdFinder<'a> {
    /// Creates a finder reading from the given annotated tree.
    pub fn new(tree: &'a PhyloTree) -> Self {
        Self { tree }
    }

    /// Finds thresholds separating each rank from the next coarser one.
    ///
    /// # Arguments
    /// * `prefixes` - Rank prefixes from coarse to fine, e.g. `k p c o f g s`
    ///
    /// # Returns
    /// One threshold per rank after the first: the midpoints of the sanitised
    /// median distances, followed by half the last median.
    ///
    /// # Errors
    /// [Tree2TaxError::ThresholdInconsistency] if the medians cannot be
    /// made non-increasing, or no rank transition had any example.
    pub fn find_thresholds<S: AsRef<str>>(&self, prefixes: &[S]) -> Result<Vec<f64>> {
        let mut median_distances = Vec::with_capacity(prefixes.len().saturating_sub(1));
        for pair in prefixes.windows(2) {
            let (upper, lower) = (pair[0].as_ref(), pair[1].as_ref());
            let examples = self.find_examples(upper, lower)?;
            if examples.is_empty() {
                warn!("No pairs were found for level prefix {}", lower);
                median_distances.push(None);
            } else {
                info!("Found distances for {} pairs for level prefix {}", examples.len(), lower);
                let distances: Vec<f64> = examples.iter().map(|e| e.distance).collect();
                median_distances.push(median(&distances));
            }
        }

        let sanitised = sanitise_example_distances(&median_distances)?;
        let mut thresholds = midpoints(&sanitised);
        if let Some(last) = sanitised.last() {
            thresholds.push(last / 2.0);
        }
        Ok(thresholds)
    }

    /// Finds pairs of sister clades with the `lower_prefix` rank below each
    /// clade with the `upper_prefix` rank.
    ///
    /// Lower clades are searched across nested rank boundaries, since the
    /// annotation of a tree is often incomplete.
    pub fn find_examples(&self, upper_prefix: &str, lower_prefix: &str) -> Result<Vec<CladeDistance>> {
        let tree = self.tree;
        let root = tree.root_index();

        let upper_nodes: Vec<VertexIndex> = tree
            .non_tips(root, true)
            .into_iter()
            .filter(|&i| has_rank(tree[i].name(), upper_prefix))
            .collect();
        debug!("Found {} upper nodes", upper_nodes.len());

        let mut examples = Vec::new();
        for upper in upper_nodes {
            let lower_nodes: Vec<VertexIndex> = tree
                .non_tips(upper, true)
                .into_iter()
                .filter(|&i| has_rank(tree[i].name(), lower_prefix))
                .collect();
            debug!("Lower nodes below {}: {:?}", upper, lower_nodes);

            // No sister pair possible
            if lower_nodes.len() < 2 {
                continue;
            }

            let max_distances = self.unique_best_distance(&lower_nodes)?;
            for (i, &first) in lower_nodes.iter().enumerate() {
                for (j, &second) in lower_nodes.iter().enumerate().take(i) {
                    let lca = tree.lowest_common_ancestor(first, second)?;
                    let distance = tree.accumulate_to_ancestor(first, lca)?
                        + tree.accumulate_to_ancestor(second, lca)?
                        + max_distances[i]
                        + max_distances[j];
                    examples.push(CladeDistance {
                        parent_node: upper,
                        daughter_node1: first,
                        daughter_node2: second,
                        distance,
                    });
                }
            }
        }

        Ok(examples)
    }

    /// Returns, for each node, the largest distance to a descendant tip that
    /// is not inside the clade of any other of the given nodes.
    pub fn unique_best_distance(&self, nodes: &[VertexIndex]) -> Result<Vec<f64>> {
        let annotated: HashSet<VertexIndex> = nodes.iter().copied().collect();

        nodes
            .iter()
            .map(|&node| {
                self.tree
                    .tips_excluding(node, &annotated)
                    .into_iter()
                    .map(|tip| self.tree.accumulate_to_ancestor(tip, node))
                    .try_fold(0.0, |max, dist| -> Result<f64> { Ok(max.max(dist?)) })
            })
            .collect()
    }
}

// ============================================================================
// Distance sequences (pub)
// ============================================================================
/// Returns the median of the values, averaging the two middle values of an
/// even-length list. `None` for an empty list.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let half = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[half - 1] + sorted[half]) / 2.0)
    } else {
        Some(sorted[half])
    }
}

/// Makes rank-wise median distances monotonically non-increasing.
///
/// Leading `None`s take the first known value. A later `None`, or a value
/// larger than its predecessor, starts a plateau repeating the previous value
/// until the end.
///
/// # Errors
/// [Tree2TaxError::ThresholdInconsistency] if a known value follows the
/// plateau start, or if no value is known at all.
pub fn sanitise_example_distances(example_distances: &[Option<f64>]) -> Result<Vec<f64>> {
    let inconsistent = || Tree2TaxError::ThresholdInconsistency(example_distances.to_vec());

    let (first_known, first) = example_distances
        .iter()
        .enumerate()
        .find_map(|(i, d)| d.map(|d| (i, d)))
        .ok_or_else(inconsistent)?;

    let mut sanitised = vec![first; first_known + 1];
    let mut previous = first;
    let mut in_plateau = false;
    for dist in &example_distances[first_known + 1..] {
        match (in_plateau, dist) {
            (false, Some(d)) if *d <= previous => previous = *d,
            (false, _) | (true, None) => in_plateau = true,
            (true, Some(_)) => return Err(inconsistent()),
        }
        sanitised.push(previous);
    }

    Ok(sanitised)
}

/// Turns rank-wise median distances into thresholds halfway between
/// consecutive sanitised distances.
///
/// # Example
/// ```
/// use tree2tax::threshold::thresholds_from_example_distances;
///
/// let thresholds = thresholds_from_example_distances(&[None, Some(3.0), Some(2.0), Some(1.0)])?;
/// assert_eq!(thresholds, vec![3.0, 2.5, 1.5]);
/// # Ok::<(), tree2tax::Tree2TaxError>(())
/// ```
pub fn thresholds_from_example_distances(example_distances: &[Option<f64>]) -> Result<Vec<f64>> {
    Ok(midpoints(&sanitise_example_distances(example_distances)?))
}

fn midpoints(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0]), Some(2.5));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(midpoints(&[3.0, 2.0, 1.0]), vec![2.5, 1.5]);
        assert!(midpoints(&[3.0]).is_empty());
    }
}
