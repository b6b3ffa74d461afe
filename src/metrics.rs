//! Run metrics
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder.

/// Metric names follow `cluster_viz_{name}` with a `_total` suffix on counters.
macro_rules! run_metric {
    (counter, $name:literal) => {
        concat!("cluster_viz_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("cluster_viz_", $name)
    };
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub help: &'static str,
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_file_processed(records: usize) {
        ::metrics::counter!(run_metric!(counter, "files_processed")).increment(1);
        ::metrics::histogram!(run_metric!(histogram, "records_per_file")).record(records as f64);
    }

    pub fn record_file_skipped() {
        ::metrics::counter!(run_metric!(counter, "files_skipped")).increment(1);
    }

    pub fn record_line_error() {
        ::metrics::counter!(run_metric!(counter, "line_errors")).increment(1);
    }

    pub fn record_run(records_written: usize, duration_secs: f64) {
        ::metrics::counter!(run_metric!(counter, "records")).increment(records_written as u64);
        ::metrics::histogram!(run_metric!(histogram, "run_duration_seconds")).record(duration_secs);
    }

    pub fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: run_metric!(counter, "files_processed"),
                help: "Cluster files read to completion",
            },
            MetricDoc {
                name: run_metric!(counter, "files_skipped"),
                help: "Files matching cluster_*.jsonl whose id is not an integer",
            },
            MetricDoc {
                name: run_metric!(counter, "line_errors"),
                help: "Lines that failed to parse or transform",
            },
            MetricDoc {
                name: run_metric!(counter, "records"),
                help: "Records written to the output file",
            },
            MetricDoc {
                name: run_metric!(histogram, "records_per_file"),
                help: "Records produced per cluster file",
            },
            MetricDoc {
                name: run_metric!(histogram, "run_duration_seconds"),
                help: "Wall time of a full pipeline run",
            },
        ]
    }
}
