//! Interactive line shell over one in-memory session.
//!
//! Every command runs to completion before the next line is read. Errors are
//! reported and the shell keeps going with state unchanged.

use chrono::Utc;
use posyandu_core::app::{DeleteOutcome, MeasurementPatch};
use posyandu_core::config::ExportConfig;
use posyandu_core::*;
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  login <user> <password> [admin|worker]   Sign in (role defaults to worker)
  logout                                   Sign out
  whoami                                   Show the current role
  add name=.. age=.. gender=.. height=.. weight=.. [contact=..]
                                           Register a measurement
  preview key=value...                     Classify without saving
  edit <id> key=value...                   Change fields of a record
  delete <id>                              Delete a record (admin)
  list [query]                             Show records, optionally filtered
  stats                                    Dashboard statistics
  trend                                    Six-bar BMI trend
  export csv | export pdf                  Export records (admin)
  dump                                     Print the session as JSON
  help                                     Show this help
  quit                                     Leave (all records are discarded)

Values containing spaces can be double-quoted: name=\"Siti Aminah\"";

/// What the loop should do after a command
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W> {
    app: Posyandu,
    export: ExportConfig,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(app: Posyandu, export: ExportConfig, input: R, out: W) -> Self {
        Self {
            app,
            export,
            input,
            out,
        }
    }

    /// Read and execute commands until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Posyandu Growth Monitor (demo). Type 'help' for commands."
        )?;

        loop {
            write!(self.out, "[{}] > ", self.app.session().role_label())?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }

            match self.execute(line.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => writeln!(self.out, "✗ {}", e)?,
            }
        }

        writeln!(self.out, "Session ended. Records were not saved.")?;
        Ok(())
    }

    fn execute(&mut self, line: &str) -> Result<Flow> {
        let args = split_args(line)?;
        let Some((command, rest)) = args.split_first() else {
            return Ok(Flow::Continue);
        };

        match command.to_lowercase().as_str() {
            "help" | "?" => writeln!(self.out, "{}", HELP)?,
            "login" => self.cmd_login(rest)?,
            "logout" => {
                self.app.logout();
                writeln!(self.out, "✓ Logged out")?;
            }
            "whoami" => self.cmd_whoami()?,
            "add" => self.cmd_add(rest)?,
            "preview" => self.cmd_preview(rest)?,
            "edit" => self.cmd_edit(rest)?,
            "delete" => self.cmd_delete(rest)?,
            "list" => self.cmd_list(&rest.join(" "))?,
            "stats" => self.cmd_stats()?,
            "trend" => self.cmd_trend()?,
            "export" => self.cmd_export(rest)?,
            "dump" => {
                let json = serde_json::to_string_pretty(&self.app.snapshot(Utc::now()))?;
                writeln!(self.out, "{}", json)?;
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            other => {
                return Err(Error::Other(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )))
            }
        }

        Ok(Flow::Continue)
    }

    fn cmd_login(&mut self, args: &[String]) -> Result<()> {
        let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");
        let role: Role = arg(2).parse()?;
        let user = self.app.login(arg(0), arg(1), role)?;
        writeln!(
            self.out,
            "✓ Logged in as {} ({})",
            user.name,
            user.role.label()
        )?;
        Ok(())
    }

    fn cmd_whoami(&mut self) -> Result<()> {
        match self.app.session().user() {
            Some(user) => writeln!(self.out, "{} ({})", user.name, user.role.label())?,
            None => writeln!(self.out, "Guest")?,
        }
        Ok(())
    }

    fn cmd_add(&mut self, args: &[String]) -> Result<()> {
        let mut input = MeasurementInput::default();
        parse_patch(args)?.apply(&mut input);

        let record = self.app.add(&input)?;
        writeln!(
            self.out,
            "✓ Added {} [{}]: BMI {}, status {}",
            record.name,
            record.short_id(),
            record.bmi,
            record.status
        )?;
        Ok(())
    }

    fn cmd_preview(&mut self, args: &[String]) -> Result<()> {
        let mut input = MeasurementInput::default();
        parse_patch(args)?.apply(&mut input);
        let result = self.app.preview(&input);
        writeln!(self.out, "{}", format_classification(&result))?;
        Ok(())
    }

    fn cmd_edit(&mut self, args: &[String]) -> Result<()> {
        let (prefix, fields) = args
            .split_first()
            .ok_or_else(|| Error::Validation("usage: edit <id> key=value...".into()))?;
        let patch = parse_patch(fields)?;
        if patch.is_empty() {
            return Err(Error::Validation("nothing to change".into()));
        }

        let id = self.app.find_by_prefix(prefix)?.id;
        let record = self.app.edit(id, &patch)?;
        writeln!(
            self.out,
            "✓ Updated {} [{}]: BMI {}, status {}",
            record.name,
            record.short_id(),
            record.bmi,
            record.status
        )?;
        Ok(())
    }

    fn cmd_delete(&mut self, args: &[String]) -> Result<()> {
        let prefix = args
            .first()
            .ok_or_else(|| Error::Validation("usage: delete <id>".into()))?;

        // Check the gate before resolving, so guests learn nothing about ids
        self.app.session().require(Action::Delete)?;
        let id = self.app.find_by_prefix(prefix)?.id;

        let input = &mut self.input;
        let out = &mut self.out;
        let outcome = self.app.delete(id, |record| {
            confirm(input, out, &format!("Delete record for {}?", record.name))
        })?;

        match outcome {
            DeleteOutcome::Deleted(record) => writeln!(self.out, "✓ Deleted {}", record.name)?,
            DeleteOutcome::Declined => writeln!(self.out, "Cancelled")?,
            DeleteOutcome::Missing => writeln!(self.out, "Nothing to delete")?,
        }
        Ok(())
    }

    fn cmd_list(&mut self, query: &str) -> Result<()> {
        let rows = self.app.search(query);
        if rows.is_empty() {
            writeln!(self.out, "No records found")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{:<8}  {:<20} {:>4}  {:<6} {:>7} {:>7} {:>5}  {:<8} {}",
            "ID", "Name", "Age", "Gender", "Height", "Weight", "BMI", "Status", "Contact"
        )?;
        for r in rows {
            writeln!(
                self.out,
                "{:<8}  {:<20} {:>4}  {:<6} {:>7} {:>7} {:>5}  {:<8} {}",
                r.short_id(),
                r.name,
                r.age_months,
                r.gender,
                r.height_cm,
                r.weight_kg,
                r.bmi,
                r.status,
                r.parent_contact.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }

    fn cmd_stats(&mut self) -> Result<()> {
        let stats = self.app.stats(Utc::now());
        writeln!(self.out, "Total Children: {}", stats.total_children)?;
        writeln!(self.out, "Stunting Rate:  {}%", stats.stunting_rate)?;
        writeln!(self.out, "Avg. BMI:       {:.1}", stats.avg_bmi)?;
        writeln!(self.out, "Monthly Adds:   {}", stats.monthly_new)?;
        Ok(())
    }

    fn cmd_trend(&mut self) -> Result<()> {
        for (i, value) in self.app.trend().iter().enumerate() {
            let bar = "█".repeat((*value / 2.0).round() as usize);
            writeln!(self.out, "M{} {:>4} {}", i + 1, value, bar)?;
        }
        Ok(())
    }

    fn cmd_export(&mut self, args: &[String]) -> Result<()> {
        let format = args.first().map(|s| s.to_lowercase()).unwrap_or_default();
        match format.as_str() {
            "csv" => {
                let path = self.app.write_csv(&self.export.csv_path())?;
                writeln!(
                    self.out,
                    "✓ Exported {} records to {}",
                    self.app.records().len(),
                    path.display()
                )?;
            }
            "pdf" | "report" => {
                let path = self.app.write_report(&self.export.report_path(), Utc::now())?;
                writeln!(self.out, "✓ Report written to {}", path.display())?;
                if self.export.open_report {
                    match open::that(&path) {
                        Ok(()) => writeln!(self.out, "  Opened for printing / save as PDF")?,
                        Err(e) => {
                            tracing::warn!("Failed to open report {:?}: {}", path, e);
                            writeln!(self.out, "  Open it in a browser to print or save as PDF")?;
                        }
                    }
                } else {
                    writeln!(self.out, "  Open it in a browser to print or save as PDF")?;
                }
            }
            _ => {
                return Err(Error::Validation(
                    "usage: export csv | export pdf".into(),
                ))
            }
        }
        Ok(())
    }
}

/// Ask a yes/no question on the shell's own streams; anything but y/yes declines
fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> bool {
    if write!(out, "{} [y/N] ", question).and_then(|_| out.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Status and BMI as shown next to the form; a zero BMI shows as `-`
pub fn format_classification(result: &Classification) -> String {
    let bmi = if result.bmi > 0.0 {
        format!("{:.1}", result.bmi)
    } else {
        "-".to_string()
    };
    format!("Status: {} | BMI: {}", result.status, bmi)
}

/// Split a command line on whitespace, keeping double-quoted runs together
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::Validation("unterminated quote".into()));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

/// Parse `key=value` arguments into field overrides
fn parse_patch(args: &[String]) -> Result<MeasurementPatch> {
    let mut patch = MeasurementPatch::default();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| Error::Validation(format!("expected key=value, got '{}'", arg)))?;

        match key.trim().to_lowercase().as_str() {
            "name" => patch.name = Some(value.to_string()),
            "age" => patch.age_months = Some(parse_number(key, value)?),
            "gender" => patch.gender = Some(value.parse()?),
            "height" => patch.height_cm = Some(parse_number(key, value)?),
            "weight" => patch.weight_kg = Some(parse_number(key, value)?),
            "contact" => patch.parent_contact = Some(value.to_string()),
            other => {
                return Err(Error::Validation(format!(
                    "unknown field '{}' (expected name, age, gender, height, weight, contact)",
                    other
                )))
            }
        }
    }

    Ok(patch)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(script: &str) -> (String, Posyandu) {
        let mut config = ExportConfig::default();
        config.open_report = false;
        let mut shell = Shell::new(
            Posyandu::default(),
            config,
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        );
        shell.run().unwrap();
        (String::from_utf8(shell.out).unwrap(), shell.app)
    }

    #[test]
    fn test_split_args_quotes() {
        let args = split_args(r#"add name="Siti Aminah" age=12"#).unwrap();
        assert_eq!(args, vec!["add", "name=Siti Aminah", "age=12"]);
        assert!(split_args(r#"add name="Siti"#).is_err());
        assert!(split_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_patch() {
        let args: Vec<String> = ["age=30", "height=80.5", "gender=female", "contact=0812"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let patch = parse_patch(&args).unwrap();
        assert_eq!(patch.age_months, Some(30));
        assert_eq!(patch.height_cm, Some(80.5));
        assert_eq!(patch.gender, Some(Gender::Female));
        assert_eq!(patch.parent_contact.as_deref(), Some("0812"));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_parse_patch_errors() {
        assert!(parse_patch(&["age".to_string()]).is_err());
        assert!(parse_patch(&["age=abc".to_string()]).is_err());
        assert!(parse_patch(&["eyes=brown".to_string()]).is_err());
    }

    #[test]
    fn test_format_classification() {
        let empty = classify(0.0, 0.0, 0, Gender::Male);
        assert_eq!(format_classification(&empty), "Status: unknown | BMI: -");
        let normal = classify(10.0, 80.0, 20, Gender::Male);
        assert_eq!(format_classification(&normal), "Status: normal | BMI: 15.6");
    }

    #[test]
    fn test_add_and_list() {
        let (out, app) = run_script(
            "add name=Asep age=20 gender=male height=80 weight=10\nlist asep\n",
        );
        assert!(out.contains("✓ Added Asep"));
        assert!(out.contains("BMI 15.6, status normal"));
        assert_eq!(app.records().len(), 1);
    }

    #[test]
    fn test_invalid_add_reports_error() {
        let (out, app) = run_script("add name=Asep age=20 height=80\n");
        assert!(out.contains("✗ Validation error: weight (kg) must be positive"));
        assert!(app.records().is_empty());
    }

    #[test]
    fn test_delete_requires_admin_and_confirmation() {
        let (out, app) = run_script(
            "add name=Asep age=20 height=80 weight=10\n\
             delete x\n\
             login admin secret admin\n\
             list\n\
             quit\n",
        );
        assert!(out.contains("Permission denied"));
        assert_eq!(app.records().len(), 1);

        // Resolve the id and delete it in a second session script
        let id = app.records()[0].short_id();
        let mut shell = Shell::new(
            app,
            ExportConfig::default(),
            Cursor::new(format!("delete {}\nn\ndelete {}\ny\n", id, id).into_bytes()),
            Vec::new(),
        );
        shell.run().unwrap();
        let out = String::from_utf8(shell.out.clone()).unwrap();
        assert!(out.contains("Delete record for Asep? [y/N]"));
        assert!(out.contains("Cancelled"));
        assert!(out.contains("✓ Deleted Asep"));
        assert!(shell.app.records().is_empty());
    }

    #[test]
    fn test_edit_prefills_fields() {
        let (_, app) = run_script("add name=Asep age=20 height=80 weight=10 contact=0812\n");
        let id = app.records()[0].short_id();
        let mut shell = Shell::new(
            app,
            ExportConfig::default(),
            Cursor::new(format!("edit {} height=70 weight=9\n", id).into_bytes()),
            Vec::new(),
        );
        shell.run().unwrap();

        let record = &shell.app.records()[0];
        assert_eq!(record.name, "Asep");
        assert_eq!(record.parent_contact.as_deref(), Some("0812"));
        assert_eq!(record.status, GrowthStatus::Stunted);
    }

    #[test]
    fn test_guest_export_blocked() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.output_dir = temp_dir.path().to_path_buf();
        let mut shell = Shell::new(
            Posyandu::default(),
            config,
            Cursor::new(b"export csv\n".to_vec()),
            Vec::new(),
        );
        shell.run().unwrap();

        let out = String::from_utf8(shell.out).unwrap();
        assert!(out.contains("Permission denied"));
        assert!(!temp_dir.path().join("posyandu_records.csv").exists());
    }

    #[test]
    fn test_edit_unknown_id() {
        let (out, app) = run_script(
            "add name=Asep age=20 height=80 weight=10\n\
             edit zzzz height=70\n",
        );
        assert!(out.contains("✗ No record matches id 'zzzz'"));
        assert_eq!(app.records()[0].height_cm, 80.0);
    }

    #[test]
    fn test_unknown_command() {
        let (out, _) = run_script("fly\n");
        assert!(out.contains("unknown command 'fly'"));
    }

    #[test]
    fn test_trend_empty() {
        let (out, _) = run_script("trend\n");
        assert_eq!(out.matches("  10 ").count(), 6);
    }
}
