//! phenoplot-io: loaders and writers for phenoplot.
//!
//! Reads statistical-result records from:
//! - JSON: a bare array, or an object wrapping the array under `results`/`data`
//! - CSV/TSV tables with one record per row
//!
//! and writes derived layouts as JSON or TSV.

use anyhow::{bail, Context, Result};
use phenoplot_core::{ManhattanLayout, PipelineConfig, StatisticalRecord};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Input file formats understood by [`load_records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Table,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "csv" | "tsv" | "txt" => Ok(Self::Table),
            other => bail!("Unsupported input format: '{}' (use .json, .csv or .tsv)", other),
        }
    }
}

/// Load statistical records, choosing the parser from the file extension.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<StatisticalRecord>> {
    let path = path.as_ref();
    let records = match InputFormat::from_path(path)? {
        InputFormat::Json => load_json_records(path)?,
        InputFormat::Table => load_table_records(path)?,
    };
    debug!(path = %path.display(), records = records.len(), "loaded statistical records");
    Ok(records)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsPayload {
    List(Vec<serde_json::Value>),
    Envelope {
        #[serde(alias = "data")]
        results: Vec<serde_json::Value>,
    },
}

/// Parse a JSON payload: either `[...]` or `{"results": [...]}`.
///
/// Elements that are not valid records (for example a missing gene id) are
/// dropped; only a payload of the wrong shape is an error.
pub fn parse_json_records(raw: &str) -> Result<Vec<StatisticalRecord>> {
    let payload: RecordsPayload =
        serde_json::from_str(raw).context("Expected a JSON array of records or an object with a 'results' array")?;
    let elements = match payload {
        RecordsPayload::List(elements) => elements,
        RecordsPayload::Envelope { results } => results,
    };

    let mut records = Vec::with_capacity(elements.len());
    for (idx, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<StatisticalRecord>(element) {
            Ok(record) => records.push(record),
            Err(e) => debug!(element = idx, error = %e, "dropping malformed record"),
        }
    }
    Ok(records)
}

pub fn load_json_records<P: AsRef<Path>>(path: P) -> Result<Vec<StatisticalRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_json_records(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Detect delimiter (tab or comma) from the header line.
pub fn detect_delimiter<P: AsRef<Path>>(path: P) -> Result<u8> {
    let mut rdr = BufReader::new(File::open(&path)?);
    let mut first_line = String::new();
    std::io::BufRead::read_line(&mut rdr, &mut first_line)?;
    if first_line.contains('\t') {
        Ok(b'\t')
    } else {
        Ok(b',')
    }
}

/// Deserialize an optional f64, treating "NA", "NaN", empty strings as None
fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None => Ok(None),
        Some(t) if t.is_empty() || t.eq_ignore_ascii_case("na") || t.eq_ignore_ascii_case("nan") => Ok(None),
        Some(t) => t.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Deserialize an optional string, treating "NA" and empty strings as None
fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string())
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("na")))
}

/// Genomic coordinate; missing or "NA" stays missing.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_f64(deserializer)?.map(|v| v as i64))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = deserialize_optional_string(deserializer)?;
    Ok(matches!(
        s.map(|s| s.to_lowercase()).as_deref(),
        Some("true" | "t" | "yes" | "y" | "1")
    ))
}

/// One row of a tabular results export.
#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(alias = "geneId", alias = "mgi_gene_accession_id", alias = "mgiGeneAccessionId")]
    gene_id: String,
    #[serde(default, alias = "geneSymbol", alias = "marker_symbol", alias = "markerSymbol")]
    gene_symbol: String,
    #[serde(default, alias = "chr", alias = "chrom", alias = "chr_name", deserialize_with = "deserialize_optional_string")]
    chromosome: Option<String>,
    #[serde(default, alias = "sequenceStart", alias = "seq_region_start", alias = "start", deserialize_with = "deserialize_coordinate")]
    sequence_start: Option<i64>,
    #[serde(default, alias = "sequenceEnd", alias = "seq_region_end", alias = "end", deserialize_with = "deserialize_coordinate")]
    sequence_end: Option<i64>,
    #[serde(default, alias = "reportedPValue", alias = "p_value", alias = "pValue", deserialize_with = "deserialize_optional_f64")]
    reported_p_value: Option<f64>,
    #[serde(default, alias = "isManuallySignificant", alias = "significant", deserialize_with = "deserialize_flag")]
    is_manually_significant: bool,
    #[serde(default, alias = "procedureName", deserialize_with = "deserialize_optional_string")]
    procedure_name: Option<String>,
    #[serde(default, alias = "parameterName", deserialize_with = "deserialize_optional_string")]
    parameter_name: Option<String>,
    #[serde(default, alias = "parameterStableId", alias = "parameter_stable_id", deserialize_with = "deserialize_optional_string")]
    parameter_id: Option<String>,
    /// Pipe-separated body systems.
    #[serde(default, alias = "topLevelPhenotypes", alias = "top_level_phenotype_terms", deserialize_with = "deserialize_optional_string")]
    top_level_phenotypes: Option<String>,
    #[serde(default, alias = "project_name", alias = "projectName", deserialize_with = "deserialize_optional_string")]
    project: Option<String>,
    #[serde(default, alias = "alleleSymbol", deserialize_with = "deserialize_optional_string")]
    allele_symbol: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    zygosity: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    sex: Option<String>,
    #[serde(default, alias = "metadataGroup", deserialize_with = "deserialize_optional_string")]
    metadata_group: Option<String>,
}

impl From<RecordRow> for StatisticalRecord {
    fn from(row: RecordRow) -> Self {
        let top_level_phenotypes = row
            .top_level_phenotypes
            .map(|s| {
                s.split('|')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        StatisticalRecord {
            gene_id: row.gene_id,
            gene_symbol: row.gene_symbol,
            chromosome: row.chromosome,
            sequence_start: row.sequence_start,
            sequence_end: row.sequence_end,
            reported_p_value: row.reported_p_value,
            is_manually_significant: row.is_manually_significant,
            procedure_name: row.procedure_name,
            parameter_name: row.parameter_name,
            parameter_id: row.parameter_id,
            top_level_phenotypes,
            project: row.project,
            allele_symbol: row.allele_symbol,
            zygosity: row.zygosity,
            sex: row.sex,
            metadata_group: row.metadata_group,
        }
    }
}

/// Load records from a CSV/TSV table with a header row.
pub fn load_table_records<P: AsRef<Path>>(path: P) -> Result<Vec<StatisticalRecord>> {
    let path = path.as_ref();
    let delim = detect_delimiter(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delim)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut records = Vec::new();
    for (line, row) in rdr.deserialize::<RecordRow>().enumerate() {
        let row = row.with_context(|| format!("{}: bad record on data row {}", path.display(), line + 1))?;
        records.push(row.into());
    }
    Ok(records)
}

/// Load a pipeline config from JSON; omitted keys keep their defaults.
pub fn load_pipeline_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

/// Write any serializable value as pretty JSON.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Write positioned Manhattan records to TSV.
pub fn write_positioned_tsv<P: AsRef<Path>>(path: P, layout: &ManhattanLayout) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;

    wtr.write_record([
        "gene_id",
        "gene_symbol",
        "chromosome",
        "sequence_start",
        "axis_position",
        "p_value",
        "plot_value",
    ])?;
    for point in &layout.positioned {
        let r = &point.record;
        wtr.write_record([
            r.gene_id.clone(),
            r.gene_symbol.clone(),
            r.chromosome.clone().unwrap_or_default(),
            r.sequence_start.map_or_else(|| "NA".to_string(), |s| s.to_string()),
            point.axis_position.to_string(),
            r.reported_p_value.map_or_else(|| "NA".to_string(), |p| p.to_string()),
            point.plot_value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenoplot_core::{build_manhattan, PipelineConfig};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_with_suffix(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    #[test]
    fn test_detect_delimiter_tab() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "a\tb\tc").unwrap();
        assert_eq!(detect_delimiter(f.path()).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "a,b,c").unwrap();
        assert_eq!(detect_delimiter(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(InputFormat::from_path("x.JSON").unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path("x.tsv").unwrap(), InputFormat::Table);
        assert!(InputFormat::from_path("x.parquet").is_err());
    }

    #[test]
    fn test_parse_envelope() {
        let raw = r#"{"results": [{"geneId": "MGI:1", "chromosome": "4", "reportedPValue": 0.01}]}"#;
        let records = parse_json_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chromosome.as_deref(), Some("4"));

        let raw = r#"{"data": []}"#;
        assert!(parse_json_records(raw).unwrap().is_empty());
        assert!(parse_json_records(r#"{"genes": 3}"#).is_err());
    }

    #[test]
    fn test_null_fields_do_not_reject_payload() {
        let raw = r#"[
            {"geneId": "MGI:1", "chromosome": "1", "sequenceStart": 100, "reportedPValue": 0.01},
            {"geneId": "MGI:2", "geneSymbol": null, "chromosome": "2", "sequenceStart": null,
             "sequenceEnd": null, "topLevelPhenotypes": null, "isManuallySignificant": null,
             "reportedPValue": null}
        ]"#;
        let records = parse_json_records(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].gene_symbol, "");
        assert_eq!(records[1].sequence_start, None);
        assert!(records[1].top_level_phenotypes.is_empty());
        assert!(!records[1].is_manually_significant);
    }

    #[test]
    fn test_malformed_element_dropped() {
        let raw = r#"[
            {"geneId": null, "chromosome": "1", "sequenceStart": 5},
            {"chromosome": "1"},
            {"geneId": "MGI:3", "chromosome": "1", "sequenceStart": 7}
        ]"#;
        let records = parse_json_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gene_id, "MGI:3");
    }

    #[test]
    fn test_load_table_records() {
        let mut f = temp_with_suffix(".csv");
        writeln!(f, "gene_id,gene_symbol,chromosome,sequence_start,p_value,significant,top_level_phenotypes,project").unwrap();
        writeln!(f, "MGI:1,Pax6,2,1000,1e-6,false,vision/eye phenotype|nervous system phenotype,PWG").unwrap();
        writeln!(f, "MGI:2,Abc,NA,NA,NA,true,,").unwrap();
        f.flush().unwrap();

        let records = load_records(f.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reported_p_value, Some(1e-6));
        assert_eq!(records[0].top_level_phenotypes.len(), 2);
        assert_eq!(records[0].project.as_deref(), Some("PWG"));
        assert_eq!(records[1].chromosome, None);
        assert_eq!(records[1].sequence_start, None);
        assert_eq!(records[1].reported_p_value, None);
        assert!(records[1].is_manually_significant);
    }

    #[test]
    fn test_load_json_file() {
        let mut f = temp_with_suffix(".json");
        write!(f, r#"[{{"geneId": "MGI:1", "chromosome": "X", "sequenceStart": 5}}]"#).unwrap();
        f.flush().unwrap();
        let records = load_records(f.path()).unwrap();
        assert_eq!(records[0].sequence_start, Some(5));
    }

    #[test]
    fn test_load_pipeline_config() {
        let mut f = temp_with_suffix(".json");
        write!(f, r#"{{"chromosome_order": ["1", "2", "Y"], "project_thresholds": {{}}}}"#).unwrap();
        f.flush().unwrap();
        let config = load_pipeline_config(f.path()).unwrap();
        assert_eq!(config.chromosome_order, vec!["1", "2", "Y"]);
        assert!(config.project_thresholds.is_empty());
        assert_eq!(config.manhattan_sentinel, 15.0);

        let mut bad = temp_with_suffix(".json");
        write!(bad, r#"{{"threshold": 2}}"#).unwrap();
        bad.flush().unwrap();
        assert!(load_pipeline_config(bad.path()).is_err());
    }

    #[test]
    fn test_write_outputs() {
        let records = vec![StatisticalRecord::new("MGI:1", "1", 10).with_p_value(Some(0.01))];
        let layout = build_manhattan(&records, &PipelineConfig::default()).unwrap();

        let json = temp_with_suffix(".json");
        write_json(json.path(), &layout).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json.path()).unwrap()).unwrap();
        assert_eq!(value["axisMax"], 10);
        assert_eq!(value["positioned"][0]["geneId"], "MGI:1");

        let tsv = temp_with_suffix(".tsv");
        write_positioned_tsv(tsv.path(), &layout).unwrap();
        let text = std::fs::read_to_string(tsv.path()).unwrap();
        assert!(text.starts_with("gene_id\tgene_symbol"));
        assert!(text.contains("MGI:1\tMGI:1\t1\t10\t10\t0.01\t2"));
    }
}
