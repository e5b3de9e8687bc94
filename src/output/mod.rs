use crate::fields::{Field, FieldSet, Mode};
use crate::grammar::Layout;
use crate::pipeline::{Plan, PlanItem};
use crate::reference::SpeciesEntry;
use crate::rename::{BatchOutcome, FileStatus};
use crate::undo::UndoResult;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_gps(writer: &mut impl Write, item: &PlanItem) -> io::Result<()> {
    let site = item.gps_site.as_deref().unwrap_or("no site");
    match item.gps {
        Some((latitude, longitude)) => {
            writeln!(writer, "     GPS:  {} {}, {}", site, latitude, longitude)
        }
        None => writeln!(writer, "     GPS:  {}, no coordinates", site),
    }
}

fn write_item(
    writer: &mut impl Write,
    index: usize,
    item: &PlanItem,
    mode: Mode,
) -> io::Result<()> {
    writeln!(writer, "  {}. {}", index, item.source_name)?;

    if let Some(reason) = &item.skipped {
        writeln!(writer, "     Skipped: {}", reason)?;
    } else {
        if let Some(target) = &item.target_name {
            writeln!(writer, "     To:   {}", target)?;
        }
        if mode == Mode::Meta {
            write_gps(writer, item)?;
        }
    }

    for diagnostic in &item.report.diagnostics {
        writeln!(writer, "     {}", diagnostic)?;
    }
    writeln!(writer)
}

/// Preview of a plan; nothing has been touched yet
pub fn display_dry_run(plan: &Plan, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Mode:  {}", plan.mode.description())?;
    writeln!(writer, "Files: {}", plan.items.len())?;
    writeln!(writer)?;

    if plan.items.is_empty() {
        writeln!(writer, "No files to rename.")?;
        return Ok(());
    }

    writeln!(writer, "Planned changes:")?;
    writeln!(writer)?;

    for (i, item) in plan.items.iter().enumerate() {
        write_item(writer, i + 1, item, plan.mode)?;
    }

    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(writer, "  {} files would be renamed", plan.ready_count())?;
    if plan.blocked_count() > 0 {
        writeln!(writer, "  {} files skipped or blocked", plan.blocked_count())?;
    }
    writeln!(writer)?;
    writeln!(writer, "Run without --dry to apply these changes.")?;

    Ok(())
}

/// Files that will not be renamed, listed before a real run
pub fn display_blocked(plan: &Plan, writer: &mut impl Write) -> io::Result<()> {
    let blocked: Vec<_> = plan.items.iter().filter(|i| !i.is_ready()).collect();
    if blocked.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "Not renamed ({}):", blocked.len())?;
    for (i, item) in blocked.iter().enumerate() {
        write_item(writer, i + 1, item, plan.mode)?;
    }
    Ok(())
}

/// Per-file statuses of an executed batch
pub fn display_execution_result(outcome: &BatchOutcome, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    for o in &outcome.outcomes {
        let from = file_name(&o.source_path);
        let to = file_name(&o.target_path);
        match &o.status {
            FileStatus::Committed => writeln!(writer, "  renamed      {} -> {}", from, to)?,
            FileStatus::Unchanged => writeln!(writer, "  unchanged    {}", from)?,
            FileStatus::NotProcessed => writeln!(writer, "  cancelled    {}", from)?,
            FileStatus::RolledBack(e) => writeln!(writer, "  rolled back  {}: {}", from, e)?,
            FileStatus::Rejected(e) => writeln!(writer, "  rejected     {}: {}", from, e)?,
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Successfully renamed {} files.", outcome.committed())?;
    if outcome.failed() > 0 {
        writeln!(writer, "  {} files failed and keep their names.", outcome.failed())?;
    }
    if outcome.not_processed() > 0 {
        writeln!(writer, "  {} files were not processed.", outcome.not_processed())?;
    }

    Ok(())
}

pub fn display_undo_result(result: &UndoResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    match result {
        UndoResult::NothingToUndo => writeln!(writer, "Nothing to undo.")?,
        UndoResult::Completed { restored } => {
            writeln!(writer, "Undo complete. {} files restored.", restored)?
        }
        UndoResult::Partial { restored, failed } => {
            writeln!(writer, "Undo incomplete. {} files restored.", restored)?;
            writeln!(writer, "Could not restore:")?;
            for o in failed {
                let reason = o
                    .status
                    .reason()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| format!("{:?}", o.status));
                writeln!(writer, "  - {}: {}", file_name(&o.source_path), reason)?;
            }
        }
    }
    Ok(())
}

/// Layout of each file plus the slots shared by all parsed files
pub fn display_inspection(
    rows: &[(String, Option<Layout>, Option<FieldSet>)],
    shared: &BTreeMap<Field, Option<String>>,
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer)?;
    for (name, layout, _) in rows {
        let layout = match layout {
            Some(Layout::Basic) => "basic",
            Some(Layout::Identified) => "identified",
            None => "unprocessed",
        };
        writeln!(writer, "  {:<12} {}", layout, name)?;
    }

    if shared.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "Shared fields (editable for the whole selection):")?;
    for (field, value) in shared {
        writeln!(
            writer,
            "  {:<18} {}",
            field.name(),
            value.as_deref().unwrap_or("(not set)")
        )?;
    }
    Ok(())
}

/// Species search results, tab-separated for scripting
pub fn display_species(results: &[&SpeciesEntry], writer: &mut impl Write) -> io::Result<()> {
    for entry in results {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            entry.family, entry.genus, entry.species, entry.english
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::{BatchRecord, FileOutcome, RenameError};
    use crate::validator::ValidationReport;
    use std::path::PathBuf;

    fn item(name: &str, target: Option<&str>, skipped: Option<&str>) -> PlanItem {
        PlanItem {
            source_path: PathBuf::from("/photos").join(name),
            source_name: name.to_string(),
            fields: None,
            target_name: target.map(str::to_string),
            report: ValidationReport::new(),
            skipped: skipped.map(str::to_string),
            gps: None,
            gps_site: None,
        }
    }

    fn create_test_plan() -> Plan {
        let mut blocked = item("b.jpg", None, None);
        blocked
            .report
            .error(Field::Photographer, "'ZZzzz' is not in the photographer list");
        Plan {
            mode: Mode::Basic,
            items: vec![
                item("a.jpg", Some("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_a.jpg"), None),
                blocked,
                item("c.jpg", None, Some("Already processed (Basic name)")),
            ],
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_display_dry_run() {
        let plan = create_test_plan();
        let output = render(|w| display_dry_run(&plan, w));

        assert!(output.contains("DRY RUN"));
        assert!(output.contains("Mode:  Basic"));
        assert!(output.contains("To:   DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_a.jpg"));
        assert!(output.contains("     error [photographer_code]: 'ZZzzz'"));
        assert!(output.contains("Skipped: Already processed"));
        assert!(output.contains("1 files would be renamed"));
        assert!(output.contains("2 files skipped or blocked"));
    }

    #[test]
    fn test_display_dry_run_empty() {
        let plan = Plan {
            mode: Mode::Meta,
            items: vec![],
        };
        let output = render(|w| display_dry_run(&plan, w));
        assert!(output.contains("No files to rename"));
    }

    #[test]
    fn test_display_dry_run_shows_gps_in_meta_mode() {
        let mut located = item("a.JPG", Some("G_S-A7IV_a.JPG"), None);
        located.gps = Some((1.81, 125.15));
        located.gps_site = Some("IDN-Bangka-HRS (Bangka, Hairball)".to_string());

        let mut unlocated = item("b.JPG", Some("G_S-A7IV_b.JPG"), None);
        unlocated.gps_site = Some("IDN-Lembeh-TK".to_string());

        let plan = Plan {
            mode: Mode::Meta,
            items: vec![
                located,
                unlocated,
                item("c.JPG", Some("G_c.JPG"), None),
                item("d.JPG", None, Some("Not an image name")),
            ],
        };
        let output = render(|w| display_dry_run(&plan, w));

        assert!(output.contains("     GPS:  IDN-Bangka-HRS (Bangka, Hairball) 1.81, 125.15"));
        assert!(output.contains("     GPS:  IDN-Lembeh-TK, no coordinates"));
        assert!(output.contains("     GPS:  no site, no coordinates"));
        assert_eq!(output.matches("GPS:").count(), 3);
    }

    #[test]
    fn test_display_dry_run_hides_gps_outside_meta_mode() {
        let output = render(|w| display_dry_run(&create_test_plan(), w));
        assert!(!output.contains("GPS:"));
    }

    #[test]
    fn test_display_blocked_lists_only_blocked() {
        let plan = create_test_plan();
        let output = render(|w| display_blocked(&plan, w));
        assert!(output.contains("Not renamed (2)"));
        assert!(!output.contains("a.jpg"));
    }

    #[test]
    fn test_display_execution_result() {
        let outcome = BatchOutcome {
            outcomes: vec![
                FileOutcome {
                    source_path: PathBuf::from("/p/a.jpg"),
                    target_path: PathBuf::from("/p/x_a.jpg"),
                    status: FileStatus::Committed,
                },
                FileOutcome {
                    source_path: PathBuf::from("/p/b.jpg"),
                    target_path: PathBuf::from("/p/x_b.jpg"),
                    status: FileStatus::Rejected(RenameError::Collision(PathBuf::from("/p/x_b.jpg"))),
                },
            ],
            record: BatchRecord::new(),
        };

        let output = render(|w| display_execution_result(&outcome, w));

        assert!(output.contains("renamed      a.jpg -> x_a.jpg"));
        assert!(output.contains("rejected     b.jpg: Target already exists"));
        assert!(output.contains("Successfully renamed 1 files."));
        assert!(output.contains("1 files failed"));
    }

    #[test]
    fn test_display_undo_result() {
        let output = render(|w| display_undo_result(&UndoResult::NothingToUndo, w));
        assert!(output.contains("Nothing to undo"));

        let output = render(|w| display_undo_result(&UndoResult::Completed { restored: 3 }, w));
        assert!(output.contains("3 files restored"));
    }

    #[test]
    fn test_display_inspection() {
        let rows = vec![
            ("a.jpg".to_string(), None, None),
            ("DaKle_x.jpg".to_string(), Some(Layout::Basic), None),
        ];
        let mut shared = BTreeMap::new();
        shared.insert(Field::Photographer, Some("DaKle".to_string()));
        shared.insert(Field::Family, None);

        let output = render(|w| display_inspection(&rows, &shared, w));

        assert!(output.contains("unprocessed  a.jpg"));
        assert!(output.contains("basic        DaKle_x.jpg"));
        assert!(output.contains("photographer_code  DaKle"));
        assert!(output.contains("family             (not set)"));
    }

    #[test]
    fn test_display_species() {
        let entry = SpeciesEntry {
            family: "Pomacentridae".to_string(),
            genus: "Amphiprion".to_string(),
            species: "clarkii".to_string(),
            english: "Clark's anemonefish".to_string(),
        };
        let output = render(|w| display_species(&[&entry], w));
        assert_eq!(output, "Pomacentridae\tAmphiprion\tclarkii\tClark's anemonefish\n");
    }
}
