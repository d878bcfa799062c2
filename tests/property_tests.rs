use cohort::cluster::{Clustering, Kmeans, Label};
use cohort::data::FeatureFrame;
use cohort::ensemble::{distance_features, majority_vote, NO_AFFINITY};
use cohort::preprocess::{inverse_standardize, standardize, zscore_clip};
use proptest::prelude::*;

fn label_strategy() -> impl Strategy<Value = Label> {
    prop_oneof![
        (0usize..6).prop_map(Label::Assigned),
        Just(Label::Noise),
    ]
}

fn assigned_strategy() -> impl Strategy<Value = Label> {
    (0usize..6).prop_map(Label::Assigned)
}

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let fit = Kmeans::new(k).with_seed(42).fit(&data).unwrap();

            prop_assert_eq!(fit.labels.len(), data.len());
            for &l in &fit.labels {
                match l {
                    Label::Assigned(id) => prop_assert!(id < k),
                    Label::Noise => prop_assert!(false, "k-means never emits noise"),
                }
            }
            prop_assert_eq!(fit.centers.unwrap().len(), k);
        }
    }

    #[test]
    fn prop_standardize_round_trip(
        rows in prop::collection::vec(prop::collection::vec(-1000.0f32..1000.0, 3), 2..30)
    ) {
        let frame = FeatureFrame::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            rows,
        ).unwrap();

        let (standardized, stats) = standardize(&frame).unwrap();
        let restored = inverse_standardize(&standardized, &stats).unwrap();

        for (orig, back) in frame.rows().iter().zip(restored.rows()) {
            for (o, b) in orig.iter().zip(back) {
                prop_assert!((o - b).abs() < 1e-2, "round trip drifted: {} vs {}", o, b);
            }
        }
    }

    #[test]
    fn prop_clip_never_widens_value_range(
        rows in prop::collection::vec(prop::collection::vec(-100.0f32..100.0, 2), 2..30),
        z in 0.5f64..5.0
    ) {
        let frame = FeatureFrame::new(
            vec!["a".to_string(), "b".to_string()],
            rows,
        ).unwrap();

        let clipped = zscore_clip(&frame, z).unwrap();

        for j in 0..frame.n_cols() {
            let raw_min = frame.column(j).fold(f32::INFINITY, f32::min);
            let raw_max = frame.column(j).fold(f32::NEG_INFINITY, f32::max);
            for v in clipped.column(j) {
                prop_assert!(v >= raw_min && v <= raw_max);
            }
        }
    }

    #[test]
    fn prop_vote_output_is_a_real_vote_or_noise(
        votes in prop::collection::vec((assigned_strategy(), label_strategy(), assigned_strategy()), 1..40)
    ) {
        let a: Vec<Label> = votes.iter().map(|(x, _, _)| *x).collect();
        let b: Vec<Label> = votes.iter().map(|(_, x, _)| *x).collect();
        let c: Vec<Label> = votes.iter().map(|(_, _, x)| *x).collect();

        let out = majority_vote(&a, &b, &c).unwrap();
        prop_assert_eq!(out.len(), votes.len());

        for (i, result) in out.iter().enumerate() {
            let reals: Vec<usize> = [a[i], b[i], c[i]].iter().filter_map(|l| l.id()).collect();
            match result {
                Label::Assigned(id) => prop_assert!(reals.contains(id)),
                Label::Noise => prop_assert!(reals.is_empty()),
            }
        }

        // Pure function: voting again changes nothing.
        prop_assert_eq!(majority_vote(&a, &b, &c).unwrap(), out);
    }

    #[test]
    fn prop_distance_features_aligned_and_noise_sentineled(
        points in prop::collection::vec(prop::collection::vec(-50.0f32..50.0, 3), 1..30),
        noise_mask in prop::collection::vec(any::<bool>(), 30)
    ) {
        let n = points.len();
        let db_labels: Vec<Label> = (0..n)
            .map(|i| if noise_mask[i] { Label::Noise } else { Label::Assigned(i % 2) })
            .collect();
        let km_centroids = vec![vec![0.0, 0.0, 0.0], vec![10.0, 10.0, 10.0]];
        let gmm_means = vec![vec![-5.0, 0.0, 5.0]];

        let features = distance_features(&points, &km_centroids, &db_labels, &gmm_means).unwrap();

        prop_assert_eq!(features.len(), n);
        for (i, row) in features.iter().enumerate() {
            prop_assert_eq!(row.len(), 3);
            prop_assert!(row[0] >= 0.0 && row[1] >= 0.0 && row[2] >= 0.0);
            if db_labels[i].is_noise() {
                prop_assert_eq!(row[2], NO_AFFINITY);
            } else {
                prop_assert!(row[2] < NO_AFFINITY);
            }
        }
    }
}
