//! TCGA data loader
//!
//! Queries GDC for the RNA-seq file manifest, clinical annotations and
//! PAM50 subtype labels and writes each as a TSV table into a data
//! directory. PAM50 labels are rarely exposed by the API itself, so the
//! lookup walks through several fallbacks before giving up:
//!
//! 1. the `/annotations` endpoint
//! 2. clinical supplementary files whose name mentions PAM50 or subtypes
//! 3. a probe of case diagnoses for molecular subtype fields
//! 4. (opt-in) the published subtype table from a list of mirrors

use crate::cli::config::{Config, Pam50Config};
use crate::display;
use crate::errors::{FetchError, Result};
use crate::gdc::filters::{and, in_filter, project_filter, QueryParams};
use crate::gdc::types::{
    AnnotationRecord, CaseHit, ClinicalRecord, FileHit, ManifestEntry, SupplementaryFile,
};
use crate::gdc::GdcClient;
use crate::pam50::{self, Pam50Table};
use crate::table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

/// Default GDC data type for the expression manifest
pub const DEFAULT_DATA_TYPE: &str = "Gene Expression Quantification";

pub const MANIFEST_FILE: &str = "file_manifest.tsv";
pub const CLINICAL_FILE: &str = "clinical_data.tsv";
pub const PAM50_FILES_MANIFEST: &str = "pam50_files_manifest.tsv";
pub const SUMMARY_FILE: &str = "fetch_summary.json";

pub const MANIFEST_COLUMNS: &[&str] = &["file_id", "file_name", "file_size", "case_id", "sample_id"];

pub const CLINICAL_COLUMNS: &[&str] = &[
    "case_id",
    "age_at_index",
    "gender",
    "race",
    "vital_status",
    "days_to_death",
    "days_to_birth",
    "primary_diagnosis",
    "tumor_stage",
    "ajcc_pathologic_t",
    "ajcc_pathologic_n",
    "ajcc_pathologic_m",
];

const SUPPLEMENTARY_COLUMNS: &[&str] = &["file_id", "file_name", "case_id"];

/// Cases inspected when probing diagnoses for subtype fields
const SUBTYPE_PROBE_SIZE: usize = 100;
const SUBTYPE_PROBE_SAMPLE: usize = 5;

/// Record of one `load_all` run, written to `fetch_summary.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchSummary {
    pub project_id: String,
    pub data_dir: PathBuf,
    pub fetched_at: DateTime<Utc>,
    pub manifest_files: usize,
    pub manifest_columns: Vec<String>,
    pub clinical_cases: usize,
    pub clinical_columns: Vec<String>,
    pub pam50_rows: usize,
    pub subtype_counts: BTreeMap<String, usize>,
}

/// Everything fetched by [`TcgaLoader::load_all`]
#[derive(Debug, Clone)]
pub struct Dataset {
    pub manifest: Vec<ManifestEntry>,
    pub clinical: Vec<ClinicalRecord>,
    pub pam50: Pam50Table,
    pub summary: FetchSummary,
}

/// Loads TCGA data for one project into a local directory
#[derive(Debug, Clone)]
pub struct TcgaLoader {
    client: GdcClient,
    data_dir: PathBuf,
    project_id: String,
    page_size: usize,
    pam50: Pam50Config,
}

impl TcgaLoader {
    /// Create a loader with default settings, creating `data_dir` if needed
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.paths.data_dir = data_dir.into().to_string_lossy().into_owned();
        let client = GdcClient::from_config(&config)?;
        Self::with_client(&config, client)
    }

    /// Create a loader from configuration and an existing client
    pub fn with_client(config: &Config, client: GdcClient) -> Result<Self> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            client,
            data_dir,
            project_id: config.gdc.project_id.clone(),
            page_size: config.gdc.page_size,
            pam50: config.pam50.clone(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn client(&self) -> &GdcClient {
        &self.client
    }

    /// Query the RNA-seq file manifest and write `file_manifest.tsv`
    pub async fn get_file_manifest(&self, data_type: &str) -> Result<Vec<ManifestEntry>> {
        info!("Querying GDC API for {} files...", data_type);

        let params = QueryParams::new(
            and(vec![
                project_filter(&self.project_id),
                in_filter("files.data_type", &[data_type]),
                in_filter("files.experimental_strategy", &["RNA-Seq"]),
            ]),
            &["file_id", "file_name", "file_size", "cases.case_id", "cases.samples.sample_id"],
            self.page_size,
        );

        let files: Vec<FileHit> = self.client.hits("/files", &params).await?;
        info!("Found {} files", files.len());

        let manifest: Vec<ManifestEntry> = files.iter().map(FileHit::to_manifest_entry).collect();
        let path = self.data_dir.join(MANIFEST_FILE);
        table::write_tsv(&path, MANIFEST_COLUMNS, &manifest)?;
        info!("Saved manifest to {}", path.display());

        Ok(manifest)
    }

    /// Query clinical annotations and write `clinical_data.tsv`
    pub async fn get_clinical_data(&self) -> Result<Vec<ClinicalRecord>> {
        info!("Querying GDC API for clinical data...");

        let params = QueryParams::new(
            project_filter(&self.project_id),
            &["case_id", "demographic", "diagnoses", "exposures"],
            self.page_size,
        );

        let cases: Vec<CaseHit> = self.client.hits("/cases", &params).await?;
        info!("Found {} cases", cases.len());

        let clinical: Vec<ClinicalRecord> = cases.iter().map(CaseHit::to_clinical_record).collect();
        let path = self.data_dir.join(CLINICAL_FILE);
        table::write_tsv(&path, CLINICAL_COLUMNS, &clinical)?;
        info!("Saved clinical data to {}", path.display());

        Ok(clinical)
    }

    /// Look up PAM50 subtype labels, trying each fallback in turn.
    ///
    /// Individual method failures are logged and never abort the lookup.
    /// Returns [`Pam50Table::Empty`] after printing operator guidance when
    /// nothing produced labels.
    pub async fn get_pam50_subtypes(&self, auto_download: bool) -> Result<Pam50Table> {
        info!("Querying GDC API for PAM50 subtype annotations...");

        info!("  Method 1: Checking annotations endpoint...");
        match self.pam50_annotations().await {
            Ok(annotations) if !annotations.is_empty() => {
                info!("  Found {} PAM50 annotations", annotations.len());
                return Ok(Pam50Table::Annotations(annotations));
            }
            Ok(_) => debug!("  No PAM50 annotations"),
            Err(e) => warn!("  Annotations endpoint failed: {}", e),
        }

        info!("  Method 2: Searching for supplementary files with PAM50...");
        match self.pam50_supplementary_files().await {
            Ok(files) if !files.is_empty() => {
                info!("  Found {} potential PAM50 files", files.len());
                info!(
                    "  Saved PAM50 files manifest to {}",
                    self.data_dir.join(PAM50_FILES_MANIFEST).display()
                );
                info!("  Note: These files need to be downloaded and parsed manually");
            }
            Ok(_) => debug!("  No supplementary files mention PAM50"),
            Err(e) => warn!("  Supplementary files search failed: {}", e),
        }

        info!("  Method 3: Checking clinical data for subtype fields...");
        match self.clinical_has_subtype_fields().await {
            Ok(true) => {
                info!("  Found potential subtype fields in clinical data");
                info!("  Note: Full clinical data may contain subtype information");
            }
            Ok(false) => debug!("  No subtype fields in sampled cases"),
            Err(e) => warn!("  Clinical subtype check failed: {}", e),
        }

        if auto_download {
            info!("  Method 4: Attempting automatic download from TCGA publications...");
            let loaded = match self.download_pam50_from_url(None, None).await {
                Ok(path) => self.load_pam50_from_file(&path).await,
                Err(e) => Err(e),
            };
            match loaded {
                Ok(table) if !table.is_empty() => return Ok(table),
                Ok(_) => warn!("  Downloaded PAM50 file contained no labels"),
                Err(e) => warn!("  Auto-download failed: {}", e),
            }
        }

        display::print_pam50_guidance();
        Ok(Pam50Table::Empty)
    }

    async fn pam50_annotations(&self) -> Result<Vec<AnnotationRecord>> {
        let params = QueryParams::new(
            and(vec![
                project_filter(&self.project_id),
                in_filter("annotation_type", &["PAM50"]),
            ]),
            &["case_id", "annotation_type", "entity_id"],
            self.page_size,
        );

        self.client.hits("/annotations", &params).await
    }

    /// Clinical files whose name mentions PAM50/subtype; writes
    /// `pam50_files_manifest.tsv` when any match
    async fn pam50_supplementary_files(&self) -> Result<Vec<SupplementaryFile>> {
        let params = QueryParams::new(
            and(vec![
                project_filter(&self.project_id),
                in_filter("files.data_category", &["Clinical"]),
            ]),
            &["file_id", "file_name", "file_size", "cases.case_id"],
            self.page_size,
        );

        let files: Vec<FileHit> = self.client.hits("/files", &params).await?;
        let matches: Vec<SupplementaryFile> = files
            .iter()
            .filter(|f| f.mentions_subtype())
            .map(FileHit::to_supplementary)
            .collect();

        if !matches.is_empty() {
            let path = self.data_dir.join(PAM50_FILES_MANIFEST);
            table::write_tsv(&path, SUPPLEMENTARY_COLUMNS, &matches)?;
        }

        Ok(matches)
    }

    async fn clinical_has_subtype_fields(&self) -> Result<bool> {
        let params = QueryParams::new(
            project_filter(&self.project_id),
            &["case_id", "diagnoses.molecular_subtype_method", "diagnoses.morphology"],
            SUBTYPE_PROBE_SIZE,
        );

        let cases: Vec<CaseHit> = self.client.hits("/cases", &params).await?;
        Ok(cases.iter().take(SUBTYPE_PROBE_SAMPLE).any(|case| {
            case.primary()
                .and_then(|d| d.molecular_subtype_method.as_deref())
                .map(|m| !m.is_empty())
                .unwrap_or(false)
        }))
    }

    /// Download the published PAM50 subtype table.
    ///
    /// With no `url`, the configured mirrors are tried in order until one
    /// yields a non-HTML file. An existing non-HTML file is reused.
    pub async fn download_pam50_from_url(
        &self,
        url: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<PathBuf> {
        let file_name = file_name.unwrap_or(self.pam50.file_name.as_str());
        let target = self.data_dir.join(file_name);

        if target.exists() {
            if read_head(&target).await.map(|h| pam50::is_html(&h)).unwrap_or(false) {
                info!("Existing file appears to be HTML, will re-download...");
            } else {
                info!("PAM50 file already exists: {}", target.display());
                return Ok(target);
            }
        }

        let urls: Vec<String> = match url {
            Some(u) => vec![u.to_string()],
            None => self.pam50.mirrors.clone(),
        };
        if urls.is_empty() {
            return Err(FetchError::Config("no PAM50 mirrors configured".to_string()));
        }

        info!("Note: This file contains PAM50 subtype assignments for 547 TCGA-BRCA samples");

        let mut last_error = None;
        for (i, url) in urls.iter().enumerate() {
            info!("Downloading PAM50 subtypes from: {}", url);
            match self.fetch_pam50_mirror(url, &target).await {
                Ok(()) => {
                    info!("Downloaded PAM50 subtypes to: {}", target.display());
                    return Ok(target);
                }
                Err(e) => {
                    if i + 1 < urls.len() {
                        warn!("  {}; trying alternative URL...", e);
                    } else {
                        warn!("  Error downloading PAM50 file: {}", e);
                    }
                    last_error = Some(e);
                }
            }
        }

        display::print_download_guidance(&target);
        Err(last_error.unwrap_or_else(|| FetchError::Generic("PAM50 download failed".to_string())))
    }

    async fn fetch_pam50_mirror(&self, url: &str, target: &Path) -> Result<()> {
        let outcome = self.client.download(url, target).await?;

        if outcome.is_html() || pam50::is_html(&read_head(target).await?) {
            tokio::fs::remove_file(target).await?;
            return Err(FetchError::HtmlPayload {
                path: target.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Parse a local PAM50 subtype file
    pub async fn load_pam50_from_file(&self, path: &Path) -> Result<Pam50Table> {
        info!("Loading PAM50 subtypes from file: {}", path.display());

        if !path.exists() {
            return Err(FetchError::NotFound(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path).await?;
        if pam50::is_html(&bytes) {
            display::print_html_file_guidance();
            return Ok(Pam50Table::Empty);
        }

        let text = String::from_utf8_lossy(&bytes);
        let table = pam50::parse_table(&text);

        match &table {
            Pam50Table::Labels(labels) => {
                info!("  Found {} samples with PAM50 subtypes", labels.len());
                if !labels.is_empty() {
                    info!("  Sample subtypes: {:?}", pam50::subtype_counts(labels));
                }
            }
            Pam50Table::Raw { columns, rows } => {
                warn!(
                    "  Could not identify subtype columns. Available columns: {:?} ({} rows)",
                    columns,
                    rows.len()
                );
            }
            Pam50Table::Empty | Pam50Table::Annotations(_) => {
                warn!("  File may be in an unexpected format");
                for (i, line) in text.lines().take(5).enumerate() {
                    let preview: String = line.chars().take(100).collect();
                    debug!("    Line {}: {}", i + 1, preview);
                }
            }
        }

        Ok(table)
    }

    /// Download a GDC file by UUID into the data directory, reusing an
    /// existing file of the same name
    pub async fn download_file(&self, file_id: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(file_name);

        if path.exists() {
            info!("File already exists: {}", path.display());
            return Ok(path);
        }

        info!("Downloading {}...", file_name);
        let url = self.client.data_url(file_id);
        self.client.download(&url, &path).await?;

        Ok(path)
    }

    /// Expression data entry point: currently the manifest, which lists the
    /// files to download and parse
    pub async fn load_expression_data(
        &self,
        manifest: Option<Vec<ManifestEntry>>,
    ) -> Result<Vec<ManifestEntry>> {
        let manifest = match manifest {
            Some(m) => m,
            None => self.get_file_manifest(DEFAULT_DATA_TYPE).await?,
        };

        info!("Note: Expression data loading requires downloading files.");
        info!("Use download_file() to download specific files, then parse them.");

        Ok(manifest)
    }

    /// Download the files listed in a manifest, optionally only the first `limit`
    pub async fn download_manifest_files(
        &self,
        manifest: &[ManifestEntry],
        limit: Option<usize>,
    ) -> Result<Vec<PathBuf>> {
        let take = limit.unwrap_or(manifest.len());
        let mut paths = Vec::new();

        for entry in manifest.iter().take(take) {
            match (&entry.file_id, &entry.file_name) {
                (Some(id), Some(name)) => paths.push(self.download_file(id, name).await?),
                _ => warn!("Skipping manifest entry without file id or name: {:?}", entry),
            }
        }

        Ok(paths)
    }

    /// Fetch manifest, clinical data and PAM50 labels, then write `fetch_summary.json`
    pub async fn load_all(&self, auto_download_pam50: bool) -> Result<Dataset> {
        info!("Loading {} data from GDC API", self.project_id);

        let manifest = self.get_file_manifest(DEFAULT_DATA_TYPE).await?;
        let clinical = self.get_clinical_data().await?;
        let pam50 = self.get_pam50_subtypes(auto_download_pam50).await?;

        let summary = FetchSummary {
            project_id: self.project_id.clone(),
            data_dir: self.data_dir.clone(),
            fetched_at: Utc::now(),
            manifest_files: manifest.len(),
            manifest_columns: MANIFEST_COLUMNS.iter().map(|c| c.to_string()).collect(),
            clinical_cases: clinical.len(),
            clinical_columns: CLINICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            pam50_rows: pam50.len(),
            subtype_counts: pam50.subtype_counts(),
        };

        let summary_path = self.data_dir.join(SUMMARY_FILE);
        tokio::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?).await?;
        info!("Data loading complete!");

        Ok(Dataset {
            manifest,
            clinical,
            pam50,
            summary,
        })
    }
}

/// First [`pam50::SNIFF_LEN`] bytes of a file
async fn read_head(path: &Path) -> Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(pam50::SNIFF_LEN);
    file.take(pam50::SNIFF_LEN as u64).read_to_end(&mut head).await?;
    Ok(head)
}
