use std::collections::HashMap;

use super::hasher::Digest;
use super::perceptual::Fingerprint;

/// Bucket files by equal content digest.
///
/// Input is indexed by enumeration order; `None` marks an unavailable digest.
/// Returns index lists with two or more members, each list and the list of
/// lists ordered by enumeration index.
pub fn cluster_exact(digests: &[Option<Digest>]) -> Vec<Vec<usize>> {
    let mut buckets: HashMap<&Digest, Vec<usize>> = HashMap::new();

    for (i, digest) in digests.iter().enumerate() {
        if let Some(d) = digest {
            buckets.entry(d).or_default().push(i);
        }
    }

    let mut groups: Vec<Vec<usize>> = buckets.into_values().filter(|v| v.len() > 1).collect();
    groups.sort_by_key(|g| g[0]);
    groups
}

/// Greedy seed-based clustering of perceptual fingerprints.
///
/// Files are visited in enumeration order. Each file not yet assigned seeds a
/// cluster and pulls in every later unassigned file within `threshold` of the
/// seed (not of other members). A file joins at most one cluster and clusters
/// of one are dropped, so the result depends on input order but is stable for
/// a fixed order.
///
/// Byte-equal fingerprints are collapsed first so each distinct pair of
/// fingerprints is measured at most once per seed.
pub fn cluster_similar(fingerprints: &[Option<Fingerprint>], threshold: u32) -> Vec<Vec<usize>> {
    let mut distinct: Vec<&Fingerprint> = Vec::new();
    let mut index_of: HashMap<&Fingerprint, usize> = HashMap::new();
    let ids: Vec<Option<usize>> = fingerprints
        .iter()
        .map(|fp| {
            fp.as_ref().map(|fp| {
                *index_of.entry(fp).or_insert_with(|| {
                    distinct.push(fp);
                    distinct.len() - 1
                })
            })
        })
        .collect();

    let mut assigned = vec![false; fingerprints.len()];
    let mut clusters = Vec::new();

    for i in 0..fingerprints.len() {
        if assigned[i] {
            continue;
        }
        let Some(seed) = ids[i] else {
            continue;
        };
        assigned[i] = true;

        let mut cluster = vec![i];
        let mut distances: Vec<Option<u32>> = vec![None; distinct.len()];

        for j in (i + 1)..fingerprints.len() {
            if assigned[j] {
                continue;
            }
            let Some(other) = ids[j] else {
                continue;
            };

            let distance =
                *distances[other].get_or_insert_with(|| distinct[seed].distance(distinct[other]));
            if distance <= threshold {
                cluster.push(j);
                assigned[j] = true;
            }
        }

        if cluster.len() > 1 {
            clusters.push(cluster);
        }
    }

    clusters
}

/// Hide every member of an exact bucket from the perceptual pass, so each
/// path belongs to at most one group.
pub fn withhold_exact_members(fingerprints: &mut [Option<Fingerprint>], exact: &[Vec<usize>]) {
    for &i in exact.iter().flatten() {
        fingerprints[i] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fingerprint with the lowest `ones` bits set; distance(a, b) = |a - b|
    fn fp(ones: u32) -> Option<Fingerprint> {
        let value: u64 = if ones >= 64 { u64::MAX } else { (1u64 << ones) - 1 };
        Some(Fingerprint::from_bytes(value.to_be_bytes().to_vec()))
    }

    fn digest_of(s: &str) -> Option<Digest> {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, s).unwrap();
        super::super::hasher::exact_fingerprint(&path).ok()
    }

    #[test]
    fn test_exact_groups_are_transitive() {
        let a = digest_of("same");
        let b = digest_of("other");
        let digests = vec![a.clone(), b.clone(), None, a.clone(), b, a];

        let groups = cluster_exact(&digests);
        assert_eq!(groups, vec![vec![0, 3, 5], vec![1, 4]]);
    }

    #[test]
    fn test_exact_ignores_singletons_and_unavailable() {
        let digests = vec![digest_of("x"), None, None, digest_of("y")];
        assert!(cluster_exact(&digests).is_empty());
    }

    #[test]
    fn test_seed_distance_not_chained() {
        // d(A,B)=2, d(A,C)=6. Hamming distances over a triangle always sum
        // to an even number, so d(B,C) is 4 rather than 3; B still reaches C.
        let fps = vec![fp(0), fp(2), fp(6)];
        let clusters = cluster_similar(&fps, 4);
        assert_eq!(clusters, vec![vec![0, 1]], "C is too far from seed A and alone afterwards");
    }

    #[test]
    fn test_first_seed_wins() {
        // B is within reach of both A and C, but A seeds first.
        let fps = vec![fp(0), fp(3), fp(6), fp(9)];
        let clusters = cluster_similar(&fps, 3);
        assert_eq!(clusters, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_equal_fingerprints_cluster_at_zero_threshold() {
        let fps = vec![fp(4), fp(10), fp(4), None, fp(4)];
        assert_eq!(cluster_similar(&fps, 0), vec![vec![0, 2, 4]]);
    }

    #[test]
    fn test_clustering_is_idempotent() {
        let fps = vec![fp(1), fp(7), fp(2), fp(30), fp(8), fp(31), None, fp(3)];
        let first = cluster_similar(&fps, 2);
        let second = cluster_similar(&fps, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_raising_threshold_never_shrinks_membership() {
        let fps = vec![fp(0), fp(2), fp(5), fp(20), fp(21), fp(40)];
        let mut previous = 0;
        for threshold in 0..=12 {
            let placed: usize = cluster_similar(&fps, threshold).iter().map(|c| c.len()).sum();
            assert!(placed >= previous, "threshold {} placed {} < {}", threshold, placed, previous);
            previous = placed;
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn test_withhold_exact_members() {
        let mut fps = vec![fp(1), fp(1), fp(2), fp(1)];
        withhold_exact_members(&mut fps, &[vec![0, 1, 3]]);
        assert!(fps[0].is_none());
        assert!(fps[1].is_none());
        assert!(fps[2].is_some());
        assert!(fps[3].is_none());
    }

    #[test]
    fn test_exact_and_similar_groups_are_disjoint() {
        // 0 and 1 are byte-identical; 2 is a near copy of them
        let digests = vec![digest_of("same"), digest_of("same"), digest_of("near")];
        let mut fps = vec![fp(10), fp(10), fp(11)];

        let exact = cluster_exact(&digests);
        withhold_exact_members(&mut fps, &exact);
        let similar = cluster_similar(&fps, 4);

        assert_eq!(exact, vec![vec![0, 1]]);
        assert!(similar.is_empty());
    }
}
