//! Clean command (the default when no subcommand is given)

use std::io::{self, BufRead, Write};

use anyhow::Result;
use crossterm::style::Stylize;
use reclaim_core::{Catalog, HostTools, Orchestrator, SafeRemover, SudoEscalator};

use super::Settings;
use crate::ui::table::{plan_table, step_table};
use crate::ui::{Output, format_size};

/// Show the plan, confirm, run every step, and print the results.
pub fn clean(settings: &Settings, output: &Output, yes: bool) -> Result<()> {
    let catalog = settings.load_catalog()?;

    output.section("Plan");
    output.print(plan_table(&catalog));
    if has_non_recoverable(&catalog) {
        output.warning(
            "Some targets need administrator rights; entries there may be deleted permanently.",
        );
    }
    output.info(&format!("Recoverable entries go to {}", settings.trash_root.display()));

    if !yes {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        if !confirm(&mut stdin.lock(), &mut stdout, "Proceed with cleanup?")? {
            output.warning("Cancelled");
            return Ok(());
        }
    }

    let remover = SafeRemover::new(&settings.trash_root, Box::new(SudoEscalator));
    let orchestrator = Orchestrator::new(catalog, remover, Box::new(HostTools));
    let report = orchestrator.run(output);

    output.section("Results");
    output.print(step_table(&report));
    println!();
    output.success(&format!("Total space freed: {}", format_size(report.total())));

    if report.destroyed() > 0 {
        output.warning(&format!(
            "{} entries could not be moved to the trash and were deleted permanently",
            report.destroyed()
        ));
    }
    if report.skipped() > 0 {
        output.warning(&format!(
            "{} entries were left in place (see RUST_LOG=warn for details)",
            report.skipped()
        ));
    }
    Ok(())
}

fn has_non_recoverable(catalog: &Catalog) -> bool {
    catalog.actionable().any(|t| !t.is_recoverable())
}

/// Ask `question` and read one line; only `y` or `Y` counts as yes.
///
/// End of input is a no.
pub fn confirm(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &str,
) -> io::Result<bool> {
    writeln!(out)?;
    write!(out, "  {} {question} (y/N) ", "WARNING:".bold().red())?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_core::{CleanupTarget, TargetKind};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn answer(text: &str) -> bool {
        let mut out = Vec::new();
        confirm(&mut Cursor::new(text), &mut out, "Proceed?").unwrap()
    }

    #[test]
    fn test_confirm_accepts_only_y() {
        assert!(answer("y\n"));
        assert!(answer("Y\n"));
        assert!(answer("  y  \n"));
        assert!(!answer("n\n"));
        assert!(!answer("yes\n"));
        assert!(!answer("\n"));
        assert!(!answer(""));
    }

    #[test]
    fn test_confirm_prints_question() {
        let mut out = Vec::new();
        confirm(&mut Cursor::new("n\n"), &mut out, "Proceed with cleanup?").unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Proceed with cleanup? (y/N)"));
    }

    #[test]
    fn test_non_recoverable_detection() {
        let target = |elevated, kind| CleanupTarget {
            path: PathBuf::from("/tmp/x"),
            label: "x".to_string(),
            elevated,
            kind,
        };
        let mut catalog = Catalog {
            targets: vec![
                target(false, TargetKind::Contents),
                target(true, TargetKind::Report),
            ],
            ..Catalog::default()
        };
        assert!(!has_non_recoverable(&catalog));

        catalog.targets.push(target(true, TargetKind::Contents));
        assert!(has_non_recoverable(&catalog));
    }
}
