use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::discovery::{discover_cluster_files, ClusterFile, Discovery};
use crate::error::{PrepError, Result};
use crate::metrics::PipelineMetrics;
use crate::normalize::Normalizer;
use crate::palette::{ColorPalette, HueStrategy};
use crate::transform::{transform_record, OutputRecord};
use crate::writer::write_output;

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub hue_strategy: HueStrategy,
    /// Abort on the first bad line instead of collecting line errors
    pub strict: bool,
}

/// A line that could not be turned into an output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineError {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.reason)
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub clusters_found: usize,
    pub skipped_files: Vec<PathBuf>,
    pub records_written: usize,
    pub line_errors: Vec<LineError>,
    pub output_file: PathBuf,
}

/// Records gathered from the cluster files, before writing
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<OutputRecord>,
    pub line_errors: Vec<LineError>,
}

pub struct Pipeline {
    options: PipelineOptions,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(options: PipelineOptions, normalizer: Normalizer) -> Self {
        Self {
            options,
            normalizer,
        }
    }

    /// Discover, transform and write. Nothing is written if a fatal error
    /// occurs before the writer runs.
    #[instrument(skip(self), fields(input_dir = %self.options.input_dir.display()))]
    pub fn run(&self) -> Result<PipelineResult> {
        let started = Instant::now();

        let discovery = discover_cluster_files(&self.options.input_dir)?;
        let palette = ColorPalette::generate(discovery.cluster_count(), self.options.hue_strategy);

        info!(
            "Found {} cluster files ({} skipped)",
            discovery.cluster_count(),
            discovery.skipped.len()
        );
        println!("Found {} cluster files. Processing...", discovery.cluster_count());

        for skipped in &discovery.skipped {
            let name = display_name(skipped);
            warn!("Skipping file with non-integer cluster id: {}", name);
            println!("Skipping weird filename: {}", name);
            PipelineMetrics::record_file_skipped();
        }

        let collected = self.collect(&discovery, &palette)?;
        let records_written = write_output(&self.options.output_file, &collected.records)?;

        PipelineMetrics::record_run(records_written, started.elapsed().as_secs_f64());
        info!(
            records_written,
            line_errors = collected.line_errors.len(),
            "Pipeline finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        println!(
            "Success! Saved {} papers to {}",
            records_written,
            self.options.output_file.display()
        );

        Ok(PipelineResult {
            clusters_found: discovery.cluster_count(),
            skipped_files: discovery.skipped,
            records_written,
            line_errors: collected.line_errors,
            output_file: self.options.output_file.clone(),
        })
    }

    /// Reads every discovered cluster file in order and transforms its lines.
    pub fn collect(&self, discovery: &Discovery, palette: &ColorPalette) -> Result<Collected> {
        let mut collected = Collected::default();

        for cluster in &discovery.clusters {
            let base_color =
                palette
                    .color(cluster.cluster_id)
                    .ok_or(PrepError::PaletteIndexOutOfRange {
                        cluster_id: cluster.cluster_id,
                        palette_len: palette.len(),
                    })?;
            let produced = self.process_file(cluster, base_color, &mut collected)?;
            PipelineMetrics::record_file_processed(produced);
        }

        Ok(collected)
    }

    /// Returns the number of records produced from this file.
    #[instrument(skip(self, base_color, collected), fields(cluster_id = cluster.cluster_id))]
    fn process_file(
        &self,
        cluster: &ClusterFile,
        base_color: &str,
        collected: &mut Collected,
    ) -> Result<usize> {
        let file = File::open(&cluster.path).map_err(|e| PrepError::io(&cluster.path, e))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0;
        let mut produced = 0;

        // Raw bytes per line so invalid UTF-8 fails only its own line
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| PrepError::io(&cluster.path, e))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let outcome = match std::str::from_utf8(&buf) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => self.process_line(text, cluster.cluster_id, base_color),
                Err(e) => Err(PrepError::InvalidUtf8(e)),
            };

            match outcome {
                Ok(record) => {
                    collected.records.push(record);
                    produced += 1;
                }
                Err(e) => {
                    let reason = e.to_string();
                    if self.options.strict {
                        error!("Aborting on malformed line {}: {}", line_no, reason);
                        return Err(PrepError::MalformedLine {
                            path: cluster.path.clone(),
                            line: line_no,
                            reason,
                        });
                    }
                    warn!("Skipping malformed line {}: {}", line_no, reason);
                    PipelineMetrics::record_line_error();
                    collected.line_errors.push(LineError {
                        path: cluster.path.clone(),
                        line: line_no,
                        reason,
                    });
                }
            }
        }

        debug!("Produced {} records from {}", produced, display_name(&cluster.path));
        Ok(produced)
    }

    fn process_line(&self, line: &str, cluster_id: u32, base_color: &str) -> Result<OutputRecord> {
        let raw: serde_json::Value = serde_json::from_str(line)?;
        transform_record(&raw, cluster_id, base_color, &self.normalizer)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizationTable;
    use std::fs;

    fn pipeline(input_dir: &Path, output_file: PathBuf, strict: bool) -> Pipeline {
        Pipeline::new(
            PipelineOptions {
                input_dir: input_dir.to_path_buf(),
                output_file,
                hue_strategy: HueStrategy::Even,
                strict,
            },
            Normalizer::new(NormalizationTable::builtin().unwrap()),
        )
    }

    #[test]
    fn bad_lines_are_collected_with_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cluster_0.jsonl"),
            "{\"id\":1}\nnot json\n\n{\"id\":2,\"x\":\"east\"}\n{\"id\":3}\n",
        )
        .unwrap();

        let p = pipeline(dir.path(), dir.path().join("out.json"), false);
        let result = p.run().unwrap();

        assert_eq!(result.records_written, 2);
        let lines: Vec<usize> = result.line_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert!(result.line_errors[1].reason.contains("'x'"));
        assert!(result.line_errors[0].to_string().contains("cluster_0.jsonl:2:"));
    }

    #[test]
    fn invalid_utf8_fails_only_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = b"{\"id\":1}\n{\"title\":\"".to_vec();
        body.extend_from_slice(&[0xFF, 0xFE]);
        body.extend_from_slice(b"\"}\n{\"id\":3}\n");
        fs::write(dir.path().join("cluster_0.jsonl"), body).unwrap();
        let output = dir.path().join("out.json");

        let result = pipeline(dir.path(), output.clone(), false).run().unwrap();
        assert_eq!(result.records_written, 2);
        assert_eq!(result.line_errors.len(), 1);
        assert_eq!(result.line_errors[0].line, 2);
        assert!(result.line_errors[0].reason.contains("UTF-8"));

        let written: Vec<OutputRecord> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let ids: Vec<serde_json::Value> = written.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![serde_json::json!(1), serde_json::json!(3)]);
    }

    #[test]
    fn invalid_utf8_aborts_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cluster_0.jsonl"), [b'{', 0xC3, b'}', b'\n']).unwrap();
        let output = dir.path().join("out.json");

        let err = pipeline(dir.path(), output.clone(), true).run().unwrap_err();
        assert!(matches!(err, PrepError::MalformedLine { line: 1, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cluster_0.jsonl"), "{\"id\":1}\r\n\r\n{\"id\":2}\r\n").unwrap();

        let result = pipeline(dir.path(), dir.path().join("out.json"), false).run().unwrap();
        assert_eq!(result.records_written, 2);
        assert!(result.line_errors.is_empty());
    }

    #[test]
    fn strict_mode_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cluster_0.jsonl"), "{\"id\":1}\n{oops\n").unwrap();
        let output = dir.path().join("out.json");

        let err = pipeline(dir.path(), output.clone(), true).run().unwrap_err();
        assert!(matches!(err, PrepError::MalformedLine { line: 2, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn cluster_id_beyond_palette_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cluster_0.jsonl"), "{}\n").unwrap();
        fs::write(dir.path().join("cluster_5.jsonl"), "{}\n").unwrap();
        let output = dir.path().join("out.json");

        let err = pipeline(dir.path(), output.clone(), false).run().unwrap_err();
        assert!(matches!(
            err,
            PrepError::PaletteIndexOutOfRange {
                cluster_id: 5,
                palette_len: 2
            }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn empty_directory_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        let output = dir.path().join("out.json");

        let result = pipeline(&input, output.clone(), false).run().unwrap();
        assert_eq!(result.clusters_found, 0);
        assert_eq!(result.records_written, 0);
        assert_eq!(fs::read_to_string(output).unwrap(), "[]");
    }
}
