//! Type definitions for GDC API responses and the flat tables built from them
//!
//! Every nested GDC field is optional: the API omits keys that have no
//! value for a given case or file.

use serde::{Deserialize, Deserializer, Serialize};

/// Search response envelope: `{"data": {"hits": [...]}}`
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub data: Option<SearchData<T>>,
}

/// Payload of a search response
#[derive(Debug, Deserialize)]
pub struct SearchData<T> {
    pub hits: Option<Vec<T>>,
}

impl<T> SearchResponse<T> {
    /// Hits, or `None` when the envelope lacks `data` or `hits`
    pub fn into_hits(self) -> Option<Vec<T>> {
        self.data.and_then(|d| d.hits)
    }
}

/// GDC sends `null` as well as omitting the key for empty lists
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A file returned by `/files`
#[derive(Debug, Clone, Deserialize)]
pub struct FileHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cases: Vec<CaseRef>,
}

/// Case reference nested in a file hit
#[derive(Debug, Clone, Deserialize)]
pub struct CaseRef {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub samples: Vec<SampleRef>,
}

/// Sample reference nested in a case
#[derive(Debug, Clone, Deserialize)]
pub struct SampleRef {
    #[serde(default)]
    pub sample_id: Option<String>,
}

/// A case returned by `/cases`
#[derive(Debug, Clone, Deserialize)]
pub struct CaseHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub demographic: Option<Demographic>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub diagnoses: Vec<Diagnosis>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demographic {
    #[serde(default)]
    pub age_at_index: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub vital_status: Option<String>,
    #[serde(default)]
    pub days_to_death: Option<f64>,
    #[serde(default)]
    pub days_to_birth: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Diagnosis {
    #[serde(default)]
    pub primary_diagnosis: Option<String>,
    #[serde(default)]
    pub tumor_stage: Option<String>,
    #[serde(default)]
    pub ajcc_pathologic_t: Option<String>,
    #[serde(default)]
    pub ajcc_pathologic_n: Option<String>,
    #[serde(default)]
    pub ajcc_pathologic_m: Option<String>,
    #[serde(default)]
    pub molecular_subtype_method: Option<String>,
    #[serde(default)]
    pub morphology: Option<String>,
}

/// An annotation returned by `/annotations`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub annotation_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
}

/// One row of `file_manifest.tsv`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub case_id: Option<String>,
    pub sample_id: Option<String>,
}

/// One row of `clinical_data.tsv`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalRecord {
    pub case_id: Option<String>,
    pub age_at_index: Option<i64>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub vital_status: Option<String>,
    pub days_to_death: Option<i64>,
    pub days_to_birth: Option<i64>,
    pub primary_diagnosis: Option<String>,
    pub tumor_stage: Option<String>,
    pub ajcc_pathologic_t: Option<String>,
    pub ajcc_pathologic_n: Option<String>,
    pub ajcc_pathologic_m: Option<String>,
}

/// One row of `pam50_files_manifest.tsv`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplementaryFile {
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub case_id: Option<String>,
}

impl FileHit {
    /// GDC reports the UUID as `id`; `file_id` is only present when requested
    pub fn uuid(&self) -> Option<String> {
        self.id.clone().or_else(|| self.file_id.clone())
    }

    fn first_case(&self) -> Option<&CaseRef> {
        self.cases.first()
    }

    /// Whether the file name suggests a subtype table
    pub fn mentions_subtype(&self) -> bool {
        let name = self.file_name.as_deref().unwrap_or_default().to_lowercase();
        name.contains("pam50") || name.contains("subtype")
    }

    /// Flatten to a manifest row using the first case and its first sample
    pub fn to_manifest_entry(&self) -> ManifestEntry {
        let case = self.first_case();
        ManifestEntry {
            file_id: self.uuid(),
            file_name: self.file_name.clone(),
            file_size: self.file_size,
            case_id: case.and_then(|c| c.case_id.clone()),
            sample_id: case
                .and_then(|c| c.samples.first())
                .and_then(|s| s.sample_id.clone()),
        }
    }

    pub fn to_supplementary(&self) -> SupplementaryFile {
        SupplementaryFile {
            file_id: self.uuid(),
            file_name: self.file_name.clone(),
            case_id: self.first_case().and_then(|c| c.case_id.clone()),
        }
    }
}

impl CaseHit {
    pub fn uuid(&self) -> Option<String> {
        self.id.clone().or_else(|| self.case_id.clone())
    }

    /// First diagnosis, if any
    pub fn primary(&self) -> Option<&Diagnosis> {
        self.diagnoses.first()
    }

    /// Flatten to a clinical row using the first diagnosis
    pub fn to_clinical_record(&self) -> ClinicalRecord {
        let demographic = self.demographic.clone().unwrap_or_default();
        let diagnosis = self.primary().cloned().unwrap_or_default();
        let whole = |v: Option<f64>| v.map(|n| n.round() as i64);

        ClinicalRecord {
            case_id: self.uuid(),
            age_at_index: whole(demographic.age_at_index),
            gender: demographic.gender,
            race: demographic.race,
            vital_status: demographic.vital_status,
            days_to_death: whole(demographic.days_to_death),
            days_to_birth: whole(demographic.days_to_birth),
            primary_diagnosis: diagnosis.primary_diagnosis,
            tumor_stage: diagnosis.tumor_stage,
            ajcc_pathologic_t: diagnosis.ajcc_pathologic_t,
            ajcc_pathologic_n: diagnosis.ajcc_pathologic_n,
            ajcc_pathologic_m: diagnosis.ajcc_pathologic_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_hit_flattening() {
        let hit: FileHit = serde_json::from_value(serde_json::json!({
            "id": "f-1",
            "file_name": "a.rna_seq.augmented_star_gene_counts.tsv",
            "file_size": 4242,
            "cases": [
                {"case_id": "c-1", "samples": [{"sample_id": "s-1"}, {"sample_id": "s-2"}]},
                {"case_id": "c-2"}
            ]
        }))
        .unwrap();

        let entry = hit.to_manifest_entry();
        assert_eq!(entry.file_id.as_deref(), Some("f-1"));
        assert_eq!(entry.file_size, Some(4242));
        assert_eq!(entry.case_id.as_deref(), Some("c-1"));
        assert_eq!(entry.sample_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_file_hit_without_cases() {
        let hit: FileHit = serde_json::from_value(serde_json::json!({
            "file_id": "f-2",
            "file_name": "x.tsv"
        }))
        .unwrap();

        let entry = hit.to_manifest_entry();
        assert_eq!(entry.file_id.as_deref(), Some("f-2"));
        assert!(entry.case_id.is_none());
        assert!(entry.sample_id.is_none());
    }

    #[test]
    fn test_mentions_subtype() {
        let named = |name: &str| FileHit {
            id: None,
            file_id: None,
            file_name: Some(name.to_string()),
            file_size: None,
            cases: Vec::new(),
        };
        assert!(named("BRCA.PAM50.calls.txt").mentions_subtype());
        assert!(named("molecular_Subtype_table.tsv").mentions_subtype());
        assert!(!named("nationwidechildrens.org_clinical_patient_brca.txt").mentions_subtype());
    }

    #[test]
    fn test_case_hit_flattening() {
        let hit: CaseHit = serde_json::from_value(serde_json::json!({
            "id": "c-9",
            "demographic": {
                "age_at_index": 54,
                "gender": "female",
                "vital_status": "Alive",
                "days_to_birth": -19845.0
            },
            "diagnoses": [
                {"primary_diagnosis": "Infiltrating duct carcinoma, NOS", "ajcc_pathologic_t": "T2"},
                {"primary_diagnosis": "ignored"}
            ]
        }))
        .unwrap();

        let record = hit.to_clinical_record();
        assert_eq!(record.case_id.as_deref(), Some("c-9"));
        assert_eq!(record.age_at_index, Some(54));
        assert_eq!(record.days_to_birth, Some(-19845));
        assert!(record.days_to_death.is_none());
        assert_eq!(record.primary_diagnosis.as_deref(), Some("Infiltrating duct carcinoma, NOS"));
        assert_eq!(record.ajcc_pathologic_t.as_deref(), Some("T2"));
        assert!(record.race.is_none());
    }

    #[test]
    fn test_null_lists_are_empty() {
        let case: CaseHit = serde_json::from_value(serde_json::json!({
            "id": "c-3",
            "demographic": null,
            "diagnoses": null
        }))
        .unwrap();
        assert!(case.primary().is_none());
        assert_eq!(case.to_clinical_record().case_id.as_deref(), Some("c-3"));

        let file: FileHit = serde_json::from_value(serde_json::json!({
            "id": "f-3",
            "cases": [{"case_id": "c-3", "samples": null}]
        }))
        .unwrap();
        let entry = file.to_manifest_entry();
        assert_eq!(entry.case_id.as_deref(), Some("c-3"));
        assert!(entry.sample_id.is_none());

        let file: FileHit =
            serde_json::from_value(serde_json::json!({"id": "f-4", "cases": null})).unwrap();
        assert!(file.to_manifest_entry().case_id.is_none());
    }

    #[test]
    fn test_envelope_decodes_generic_hits() {
        let resp: SearchResponse<AnnotationRecord> = serde_json::from_value(serde_json::json!({
            "data": {"hits": [{"case_id": "c-1", "annotation_type": "PAM50", "entity_id": "e-1"}]}
        }))
        .unwrap();
        let hits = resp.into_hits().unwrap();
        assert_eq!(hits[0].entity_id.as_deref(), Some("e-1"));
    }

    #[test]
    fn test_envelope_without_hits() {
        let resp: SearchResponse<FileHit> =
            serde_json::from_value(serde_json::json!({"data": {"pagination": {}}})).unwrap();
        assert!(resp.into_hits().is_none());

        let resp: SearchResponse<FileHit> =
            serde_json::from_value(serde_json::json!({"warnings": {}})).unwrap();
        assert!(resp.into_hits().is_none());
    }
}
