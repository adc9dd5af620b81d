//! Terminal output for tcga-fetch
//!
//! Banners, download progress bars, data summaries and the operator
//! guidance printed when PAM50 labels cannot be found automatically.

use crate::loader::FetchSummary;
use crate::pam50::Pam50Table;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Horizontal rule used around section banners
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Print a titled section banner
pub fn banner(title: &str) {
    println!("{}", rule());
    println!("{}", title.bold());
    println!("{}", rule());
}

/// Progress bar for a download of `total` bytes (spinner when unknown)
pub fn download_bar(total: Option<u64>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    match total {
        Some(len) if len > 0 => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        }
        _ => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner:.green} {bytes} downloaded")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    }
}

/// Print the post-run data summary and next steps
pub fn print_summary(summary: &FetchSummary, pam50: &Pam50Table) {
    println!();
    banner("Data Summary");

    println!("\n{}", "File Manifest:".cyan());
    println!("  Total files: {}", summary.manifest_files);
    println!("  Columns: {}", summary.manifest_columns.join(", "));

    println!("\n{}", "Clinical Data:".cyan());
    println!("  Total cases: {}", summary.clinical_cases);
    println!("  Columns: {}", summary.clinical_columns.join(", "));

    if pam50.is_empty() {
        println!("\n{} {}", "PAM50 Subtypes:".cyan(), "Not found".yellow());
        println!("\n  Try manually downloading:");
        println!("    tcga-fetch fetch-pam50");
        println!("    tcga-fetch load-pam50 <PATH>");
    } else {
        println!("\n{}", "PAM50 Subtypes:".cyan());
        println!("  Total annotations: {}", pam50.len());
        println!("  Columns: {}", pam50.columns().join(", "));
        if !summary.subtype_counts.is_empty() {
            println!("  Subtype distribution:");
            for (subtype, count) in &summary.subtype_counts {
                println!("    {:<12} {}", subtype, count);
            }
        }
    }

    println!();
    println!("{}", rule());
    println!("Next steps:");
    println!("1. Review the data in {}", summary.data_dir.display());
    println!("2. Download expression files with `tcga-fetch download-manifest`");
    println!("3. Parse expression data and merge with clinical annotations");
    println!("4. Use PAM50 subtypes for classification modeling");
    println!("{}", rule());
}

/// Guidance printed when every PAM50 lookup method came up empty
pub fn print_pam50_guidance() {
    println!();
    banner("PAM50 subtypes not found via GDC API");
    println!("\nPAM50 subtypes are typically available from:");
    println!("1. Supplementary files from TCGA publications:");
    println!("   - BRCA.547.PAM50.SigClust.Subtypes.txt (from Nature 2012 paper)");
    println!("   - Available at: https://tcga-data.nci.nih.gov/docs/publications/brca_2012/");
    println!("   - Run `tcga-fetch fetch-pam50` to download automatically");
    println!("2. TCGAbiolinks R package:");
    println!("   - Use TCGAquery_subtype(tumor='BRCA') function");
    println!("   - Returns PAM50 labels for available samples");
    println!("3. PanCancerAtlas data:");
    println!("   - More complete PAM50 assignments");
    println!("   - Available via TCGAbiolinks or direct download");
    println!("\nWith this tool:");
    println!("- `tcga-fetch fetch-pam50` downloads from TCGA publications");
    println!("- `tcga-fetch load-pam50 <PATH>` parses a downloaded file");
    println!("- Or use the PAM50 gene signature to infer subtypes from expression data");
    println!("{}", rule());
}

/// Guidance printed when the PAM50 table download fails
pub fn print_download_guidance(target: &Path) {
    println!("\n  {}", "Alternative options:".yellow());
    println!("  1. Manual download from TCGA publications:");
    println!("     - Visit: https://gdc.cancer.gov/about-data/publications/brca_2012");
    println!("     - Download: BRCA.547.PAM50.SigClust.Subtypes.txt");
    println!("     - Save to: {}", target.display());
    println!("  2. Use TCGAbiolinks R package to export PAM50 subtypes");
    println!("  3. Check for updated URLs in TCGA documentation");
}

/// Guidance printed when a PAM50 file turns out to be an HTML page
pub fn print_html_file_guidance() {
    println!("  {} File appears to be HTML, not a data file", "Error:".red());
    println!("  This usually means the download URL redirected to a webpage");
    println!("  Please delete the file and try downloading again, or use an alternative source");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_width() {
        assert_eq!(rule().len(), 60);
    }

    #[test]
    fn test_hidden_bar_when_not_visible() {
        let pb = download_bar(Some(1024), false);
        assert!(pb.is_hidden());
    }

    #[test]
    fn test_bar_length_when_known() {
        let pb = download_bar(Some(2048), true);
        assert_eq!(pb.length(), Some(2048));
    }
}
