use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::ClusterError;

/// Stand-in for a consensus round: a pure function of the proposals it is
/// given, with no fault tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusStub;

impl ConsensusStub {
    /// Pick the smallest value, ties broken by the smallest node id.
    ///
    /// The result depends only on the `(node, value)` pairs, never on the
    /// order the map yields them.
    pub fn propose<'a, V, I>(&self, values: I) -> Result<V, ClusterError>
    where
        I: IntoIterator<Item = (&'a String, &'a V)>,
        V: Ord + Clone + 'a,
    {
        self.propose_by(values, V::cmp)
    }

    /// [`propose`](Self::propose) with a caller-supplied order, for values
    /// without `Ord` such as `f64` (pass `f64::total_cmp`).
    pub fn propose_by<'a, V, I, F>(&self, values: I, cmp: F) -> Result<V, ClusterError>
    where
        I: IntoIterator<Item = (&'a String, &'a V)>,
        V: Clone + 'a,
        F: Fn(&V, &V) -> Ordering,
    {
        values
            .into_iter()
            .min_by(|(node_a, value_a), (node_b, value_b)| {
                cmp(*value_a, *value_b).then_with(|| node_a.cmp(node_b))
            })
            .map(|(_, value)| value.clone())
            .ok_or(ClusterError::NoProposals)
    }

    /// Map every participant to the agreed value.
    pub fn commit<V, I, P>(&self, participants: I, value: &V) -> BTreeMap<String, V>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
        V: Clone,
    {
        participants
            .into_iter()
            .map(|node| (node.into(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn hash_map(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn minimum_value_regardless_of_construction_order() {
        let stub = ConsensusStub;
        let orders = [
            [("b", 3), ("a", 3), ("c", 1)],
            [("c", 1), ("b", 3), ("a", 3)],
            [("a", 3), ("c", 1), ("b", 3)],
        ];
        for pairs in orders {
            assert_eq!(stub.propose(&hash_map(&pairs)).unwrap(), 1);
            let ordered: BTreeMap<String, i64> = hash_map(&pairs).into_iter().collect();
            assert_eq!(stub.propose(&ordered).unwrap(), 1);
        }
    }

    #[test]
    fn tied_values_agree() {
        let stub = ConsensusStub;
        assert_eq!(stub.propose(&hash_map(&[("n1", 2), ("n2", 2)])).unwrap(), 2);
        assert_eq!(stub.propose(&hash_map(&[("b", 1), ("a", 1)])).unwrap(), 1);
    }

    #[test]
    fn float_proposals_use_total_order() {
        let stub = ConsensusStub;
        let values: HashMap<String, f64> = [("n1", 0.5), ("n2", -1.5), ("n3", f64::NAN)]
            .into_iter()
            .map(|(node, value)| (node.to_string(), value))
            .collect();
        assert_eq!(stub.propose_by(&values, f64::total_cmp).unwrap(), -1.5);

        let empty: HashMap<String, f64> = HashMap::new();
        assert!(matches!(
            stub.propose_by(&empty, f64::total_cmp),
            Err(ClusterError::NoProposals)
        ));
    }

    #[test]
    fn empty_proposal_is_an_error() {
        let empty: HashMap<String, i64> = HashMap::new();
        assert!(matches!(
            ConsensusStub.propose(&empty),
            Err(ClusterError::NoProposals)
        ));
    }

    #[test]
    fn commit_maps_sorted_participants() {
        let committed = ConsensusStub.commit(["n3", "n1", "n2"], &"v".to_string());
        let pairs: Vec<(&str, &str)> = committed
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, vec![("n1", "v"), ("n2", "v"), ("n3", "v")]);
    }
}
