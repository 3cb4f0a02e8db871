use super::*;

use std::collections::HashSet;

fn image(id: &str, embedding: Vec<f32>) -> ImageEmbedding {
    ImageEmbedding::new(id, embedding)
}

fn engine() -> ClusterEngine {
    ClusterEngine::new(ClusterConfig::default()).unwrap()
}

#[tokio::test]
async fn near_duplicates_group_and_orthogonal_stays_alone() {
    let images = vec![
        image("img1", vec![1.0, 0.0, 0.0]),
        image("img2", vec![0.99, 0.01, 0.0]),
        image("img3", vec![0.0, 1.0, 0.0]),
    ];

    let result = engine().cluster_images(&images).await;

    assert_eq!(result.clusters.len(), 2);
    assert_eq!(result.clusters[0], vec!["img1", "img2"]);
    assert_eq!(result.clusters[1], vec!["img3"]);
    assert_eq!(result.pair_count, 3);
    assert!(result.failures.is_empty());
}

#[tokio::test]
async fn clusters_partition_the_input_id_set() {
    // A mix of two tight groups plus two loners.
    let images = vec![
        image("a1", vec![1.0, 0.0, 0.0, 0.0]),
        image("b1", vec![0.0, 1.0, 0.0, 0.0]),
        image("a2", vec![0.999, 0.01, 0.0, 0.0]),
        image("c1", vec![0.0, 0.0, 1.0, 0.0]),
        image("b2", vec![0.01, 0.999, 0.0, 0.0]),
        image("d1", vec![0.0, 0.0, 0.0, 1.0]),
    ];

    let result = engine().cluster_images(&images).await;

    let mut seen = HashSet::new();
    for cluster in &result.clusters {
        assert!(!cluster.is_empty(), "clusters must be non-empty");
        for id in cluster {
            assert!(seen.insert(id.clone()), "id {id} appeared twice");
        }
    }
    let expected: HashSet<String> = images.iter().map(|i| i.id.clone()).collect();
    assert_eq!(seen, expected);
    assert_eq!(result.clusters.len(), 4);
}

#[tokio::test]
async fn greedy_sweep_is_seed_first_not_transitive() {
    // b sits between a and c: similar to both, while a and c fall below the
    // threshold with each other. With a as the first seed, b joins a's
    // cluster and c is left to seed its own. Union-find would merge all
    // three; the greedy sweep must not.
    let a = vec![1.0, 0.0];
    let b = vec![0.906_307_8, 0.422_618_3]; // 25 deg from a
    let c = vec![0.642_787_6, 0.766_044_4]; // 50 deg from a

    let images = vec![image("a", a), image("b", b), image("c", c)];
    let result = ClusterEngine::new(ClusterConfig {
        threshold: 0.9,
        ..Default::default()
    })
    .unwrap()
    .cluster_images(&images)
    .await;

    assert_eq!(result.clusters, vec![vec!["a", "b"], vec!["c"]]);
}

#[tokio::test]
async fn input_order_drives_seed_selection() {
    // Same three images, b first: b seeds and claims both a and c.
    let a = vec![1.0, 0.0];
    let b = vec![0.906_307_8, 0.422_618_3];
    let c = vec![0.642_787_6, 0.766_044_4];

    let images = vec![image("b", b), image("a", a), image("c", c)];
    let result = ClusterEngine::new(ClusterConfig {
        threshold: 0.9,
        ..Default::default()
    })
    .unwrap()
    .cluster_images(&images)
    .await;

    assert_eq!(result.clusters, vec![vec!["b", "a", "c"]]);
}

#[tokio::test]
async fn empty_input_yields_no_clusters() {
    let result = engine().cluster_images(&[]).await;
    assert!(result.clusters.is_empty());
    assert_eq!(result.pair_count, 0);
}

#[tokio::test]
async fn single_image_is_a_singleton_cluster() {
    let result = engine()
        .cluster_images(&[image("only", vec![0.5, 0.5])])
        .await;
    assert_eq!(result.clusters, vec![vec!["only"]]);
    assert_eq!(result.pair_count, 0);
}

#[tokio::test]
async fn bad_embedding_isolates_its_pairs() {
    // img2's embedding has the wrong dimension; every pair touching it fails
    // and img2 ends up a singleton, without aborting the run.
    let images = vec![
        image("img1", vec![1.0, 0.0, 0.0]),
        image("img2", vec![1.0, 0.0]),
        image("img3", vec![0.999, 0.01, 0.0]),
    ];

    let result = engine().cluster_images(&images).await;

    assert_eq!(result.failures.len(), 2);
    let failed: HashSet<&str> = result
        .failures
        .iter()
        .map(|f| f.identifier.as_str())
        .collect();
    assert_eq!(failed, HashSet::from(["pair-0-1", "pair-1-2"]));
    assert_eq!(result.clusters, vec![vec!["img1", "img3"], vec!["img2"]]);
}

#[tokio::test]
async fn threshold_is_caller_tunable() {
    let images = vec![
        image("x", vec![1.0, 0.0]),
        image("y", vec![0.8, 0.6]), // cosine 0.8 with x
    ];

    let strict = ClusterEngine::new(ClusterConfig {
        threshold: 0.92,
        ..Default::default()
    })
    .unwrap()
    .cluster_images(&images)
    .await;
    assert_eq!(strict.clusters.len(), 2);

    let loose = ClusterEngine::new(ClusterConfig {
        threshold: 0.75,
        ..Default::default()
    })
    .unwrap()
    .cluster_images(&images)
    .await;
    assert_eq!(loose.clusters.len(), 1);
}

#[tokio::test]
async fn cluster_result_serializes_for_reporting() {
    let images = vec![
        image("img1", vec![1.0, 0.0]),
        image("img2", vec![0.99, 0.01]),
    ];

    let result = engine().cluster_images(&images).await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["clusters"], serde_json::json!([["img1", "img2"]]));
    assert_eq!(json["pair_count"], 1);
    assert_eq!(json["failures"], serde_json::json!([]));
}

#[test]
fn invalid_thresholds_rejected() {
    for threshold in [f32::NAN, f32::INFINITY, 1.5, -1.5] {
        let err = ClusterEngine::new(ClusterConfig {
            threshold,
            ..Default::default()
        })
        .expect_err("threshold should be rejected");
        assert!(matches!(err, ClusterError::InvalidConfig(_)));
    }
}

#[test]
fn invalid_batch_section_rejected() {
    let err = ClusterEngine::new(ClusterConfig {
        batch: batch::BatchConfig {
            max_concurrency: 0,
            ..Default::default()
        },
        ..Default::default()
    })
    .expect_err("batch config should be rejected");
    assert!(matches!(err, ClusterError::Batch(_)));
}
