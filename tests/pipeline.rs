//! End-to-end pipeline runs over a synthetic customer CSV.

use std::io::Write;
use std::path::Path;

use cohort::config::PipelineConfig;
use cohort::data::FEATURE_COLUMNS;
use cohort::pipeline::run_pipeline;

/// Write a CSV with three well-separated behavioral blobs (40 rows each),
/// plus the optional identifier column and one row with a missing value.
fn write_dataset(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();

    let mut header = vec!["CUST_ID".to_string()];
    header.extend(FEATURE_COLUMNS.iter().map(|c| c.to_string()));
    writeln!(file, "{}", header.join(",")).unwrap();

    for i in 0..120 {
        let blob = i / 40;
        let base = (blob * 10) as f32;
        let values: Vec<String> = (0..FEATURE_COLUMNS.len())
            .map(|j| {
                let jitter = ((i * (j + 3)) % 7) as f32 * 0.05;
                format!("{:.4}", base + jitter)
            })
            .collect();
        writeln!(file, "C{:04},{}", i, values.join(",")).unwrap();
    }

    // One incomplete row; the loader must drop it.
    let mut incomplete: Vec<String> = vec!["1.0".to_string(); FEATURE_COLUMNS.len()];
    incomplete[14] = String::new();
    writeln!(file, "C9999,{}", incomplete.join(",")).unwrap();
}

fn test_config(fig_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        // Small sweep keeps the test quick; everything else is the default.
        elbow_k_max: 4,
        fig_dir: fig_dir.to_path_buf(),
        ..PipelineConfig::default()
    }
}

#[test]
fn pipeline_produces_figures_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("customers.csv");
    write_dataset(&csv_path);

    let config = test_config(&dir.path().join("figs"));
    let report = run_pipeline(&csv_path, &config).unwrap();

    // The incomplete row was dropped: 120 points everywhere.
    let km_total: usize = report.kmeans.counts.clusters.values().sum();
    assert_eq!(km_total + report.kmeans.counts.noise, 120);

    // Three clean blobs: k-means at k=3 should separate them and score well.
    assert_eq!(report.kmeans.counts.n_clusters(), 3);
    assert!(report.kmeans.silhouette.unwrap() > 0.8);
    assert!(report.kmeans.calinski_harabasz.unwrap() > 0.0);

    // Hybrid partition covers every point.
    assert_eq!(report.hybrid.counts.n_assigned(), 120);
    assert_eq!(report.hybrid.n_clusters, report.hybrid.counts.n_clusters());
    assert_eq!(report.hybrid.features.len(), 17);

    // Consensus counts cover every point too.
    let consensus_total: usize =
        report.consensus_counts.clusters.values().sum::<usize>() + report.consensus_counts.noise;
    assert_eq!(consensus_total, 120);

    // All five figures exist on disk.
    assert_eq!(report.figures.len(), 5);
    for figure in &report.figures {
        assert!(Path::new(figure).exists(), "missing figure {figure}");
    }
}

#[test]
fn pipeline_is_reproducible_under_fixed_seed() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("customers.csv");
    write_dataset(&csv_path);

    let config = test_config(&dir.path().join("figs"));
    let first = run_pipeline(&csv_path, &config).unwrap();
    let second = run_pipeline(&csv_path, &config).unwrap();

    // Identical seed and input: identical labels, counts, and metrics.
    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn pipeline_fails_fast_on_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("bad.csv");

    // Header without the TENURE column.
    let mut file = std::fs::File::create(&csv_path).unwrap();
    let cols: Vec<&str> = FEATURE_COLUMNS[..16].to_vec();
    writeln!(file, "{}", cols.join(",")).unwrap();
    let values: Vec<String> = vec!["1.0".to_string(); 16];
    writeln!(file, "{}", values.join(",")).unwrap();
    drop(file);

    let config = test_config(&dir.path().join("figs"));
    let err = run_pipeline(&csv_path, &config).unwrap_err();
    assert!(err.to_string().contains("TENURE"), "got: {err}");
}
