mod common;

use rasterfx::{BenchOpts, Mode, RunConfig, run_bench};

#[test]
fn verified_sweep_reports_every_configuration() {
    let root = common::scratch("bench_sweep");
    let in_root = common::write_inputs(&root, &["small", "big"], "img.png", 6, 9);
    let effects = common::write_effects(
        &root,
        r#"{"inPath": "img.png", "outPath": "o.png", "effects": ["S", "B", "G"]}"#,
    );
    let cfg = RunConfig::new("small+big", Mode::Sequential, 1)
        .unwrap()
        .with_paths(&effects, &in_root, root.join("out"));

    let opts = BenchOpts {
        modes: vec![Mode::ParallelByImage, Mode::ParallelByRowSlice],
        thread_counts: vec![1, 3],
        repeats: 1,
        verify: true,
    };
    let report = run_bench(&cfg, &opts).unwrap();

    assert_eq!(report.data_dirs, ["small", "big"]);
    assert_eq!(report.repeats, 1);
    assert_eq!(report.entries.len(), 4);

    let labels: Vec<_> = report
        .entries
        .iter()
        .map(|e| (e.mode.as_str(), e.threads))
        .collect();
    assert_eq!(
        labels,
        [
            ("parallel-by-image", 1),
            ("parallel-by-image", 3),
            ("parallel-by-row-slice", 1),
            ("parallel-by-row-slice", 3),
        ]
    );
    for e in &report.entries {
        assert!(e.fastest_secs >= 0.0);
        assert!(e.speedup > 0.0);
    }
    assert_eq!(report.entries[0].speedup, 1.0);
    assert_eq!(report.entries[2].speedup, 1.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"].as_array().unwrap().len(), 4);
}

#[test]
fn bench_without_modes_is_rejected() {
    let cfg = RunConfig::new("a", Mode::Sequential, 1).unwrap();
    let opts = BenchOpts {
        modes: Vec::new(),
        ..BenchOpts::default()
    };
    assert!(run_bench(&cfg, &opts).is_err());
}
