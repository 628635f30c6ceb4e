use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use lexis_core::LanguagePair;
use lexis_dictionary::{BuildStats, PackBuilder, PackBundle, RawEntry, VerificationReport, verify_pack};

use super::{LanguageArgs, print_json};

/// TSV rows to pack; blank and `#` lines are ignored, rows without a
/// definition column count as skipped.
pub fn build(
    input: &Path,
    langs: &LanguageArgs,
    out: &Path,
    forward_only: bool,
) -> anyhow::Result<BuildStats> {
    let pair = LanguagePair::parse(&langs.from, &langs.to)?;
    let content = fs::read_to_string(input)
        .with_context(|| format!("reading rows from {}", input.display()))?;

    let mut malformed = 0;
    let rows: Vec<RawEntry> = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let row = RawEntry::parse_tsv_line(line);
            if row.is_none() {
                malformed += 1;
            }
            row
        })
        .collect();

    let mut builder = PackBuilder::new(pair).converted_from("tsv");
    if forward_only {
        builder = builder.forward_only();
    }

    let (bundle, mut stats) = builder.build(rows);
    stats.skipped_rows += malformed;

    bundle
        .save_to_file(out)
        .with_context(|| format!("writing pack to {}", out.display()))?;
    tracing::info!("Wrote {} to {}", bundle.metadata.pack_id, out.display());

    Ok(stats)
}

pub fn verify(path: &Path, min_entries: Option<usize>) -> anyhow::Result<VerificationReport> {
    let bundle = PackBundle::load_from_file(path)
        .with_context(|| format!("loading pack {}", path.display()))?;
    Ok(verify_pack(&bundle, min_entries))
}

pub fn verify_command(path: &Path, min_entries: Option<usize>) -> anyhow::Result<()> {
    let report = verify(path, min_entries)?;
    print_json(&report)?;

    if !report.passed {
        bail!("pack {} failed verification", report.pack_id);
    }
    Ok(())
}
