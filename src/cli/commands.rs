//! Command dispatch: parses user values, calls services, prints results

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use clap::CommandFactory;
use colored::Colorize;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::cli::args::{
    Cli, Commands, ConfigCommands, DeadlineCommands, ExportFormat, ItemFields, OppCommands,
    WbsCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    days_until, parse_date, Deadline, ItemPatch, ItemRow, Key, NewDeadline, OpportunityFilter,
    Status,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let workspace = resolve_workspace(cli.workspace.as_deref())?;
    let settings = Settings::load(Some(&workspace))?;
    debug!("data_dir={}", settings.data_dir.display());
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Wbs { command } => cmd_wbs(&container, command),
        Commands::Deadline { command } => cmd_deadline(&container, command),
        Commands::Opp { command } => cmd_opp(&container, command),
        Commands::Config { command } => cmd_config(&container, &workspace, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_workspace(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(d) => Ok(d.to_path_buf()),
        None => std::env::current_dir().map_err(|e| InfraError::io("get current directory", e).into()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Write to `output` or stdout.
fn emit(container: &ServiceContainer, output: Option<&Path>, content: &str) -> CliResult<()> {
    match output {
        Some(path) => {
            container
                .fs
                .write(path, content)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Wrote", &path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

// ============================================================
// WBS
// ============================================================

#[instrument(level = "debug", skip(container))]
fn cmd_wbs(container: &ServiceContainer, command: &WbsCommands) -> CliResult<()> {
    let svc = &container.outline;
    match command {
        WbsCommands::List { tree } => {
            let rows = svc.rows()?;
            if rows.is_empty() {
                output::warning("outline is empty (try `trackops wbs init`)");
            } else if *tree {
                output::info(&wbs_tree(&rows));
            } else {
                for row in &rows {
                    output::info(&format_row(row));
                }
            }
        }
        WbsCommands::Init => {
            if svc.init_template()? {
                output::success("seeded outline with the proposal template");
            } else {
                output::warning("outline already has items, left unchanged");
            }
        }
        WbsCommands::Add { title } => {
            let id = svc.add_row(title)?;
            output::action("Added", &short_id(&id));
        }
        WbsCommands::Sibling { after, title } => {
            let id = svc.insert_after(after, title, false)?;
            output::action("Added", &short_id(&id));
        }
        WbsCommands::Child { after, title } => {
            let id = svc.insert_after(after, title, true)?;
            output::action("Added", &short_id(&id));
        }
        WbsCommands::Indent { item, times } => {
            let level = svc.shift(item, i32::from(*times))?;
            output::action("Level", &level);
        }
        WbsCommands::Outdent { item, times } => {
            let level = svc.shift(item, -i32::from(*times))?;
            output::action("Level", &level);
        }
        WbsCommands::Rm { item } => {
            let title = svc.remove(item)?;
            output::action("Removed", &title);
        }
        WbsCommands::Set { item, fields } => {
            let patch = item_patch(fields)?;
            if patch.is_empty() {
                return Err(CliError::InvalidArgs("nothing to update".into()));
            }
            let id = svc.update(item, &patch)?;
            output::action("Updated", &short_id(&id));
        }
        WbsCommands::Keys { at, title, keys } => {
            let keys = keys
                .iter()
                .map(|k| k.parse::<Key>())
                .collect::<Result<Vec<_>, _>>()?;
            match svc.apply_keys(at.as_deref(), &keys, title.as_deref())? {
                Some(id) => output::action("Focus", &short_id(&id)),
                None => output::warning("no item has focus"),
            }
        }
        WbsCommands::Paste { row, col, text } => {
            let text = match text {
                Some(t) => t.clone(),
                None => read_stdin()?,
            };
            let written = svc.paste(*row, *col, &text)?;
            output::action("Cells written", &written);
        }
        WbsCommands::Import { file } => {
            let added = svc.import(file)?;
            output::success(&format!("imported {} items", added));
        }
        WbsCommands::Export { format, output } => {
            let content = match format {
                ExportFormat::Csv => Some(svc.export_csv()?),
                ExportFormat::Ics => svc.export_ics(Utc::now().naive_utc())?,
            };
            match content {
                Some(c) => emit(container, output.as_deref(), &c)?,
                None => output::warning("no dated items to export"),
            }
        }
    }
    Ok(())
}

fn read_stdin() -> CliResult<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| InfraError::io("read stdin", e))?;
    Ok(buf)
}

/// Turn CLI flags into a patch. Empty owner/due clear the field.
fn item_patch(fields: &ItemFields) -> CliResult<ItemPatch> {
    let owner = fields.owner.as_ref().map(|o| {
        let o = o.trim();
        (!o.is_empty()).then(|| o.to_string())
    });
    let due = match fields.due.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(d) => Some(Some(parse_date(d)?)),
    };
    Ok(ItemPatch {
        title: fields.title.clone(),
        owner,
        due,
        status: fields.status.as_deref().map(str::parse).transpose()?,
        priority: fields.priority.as_deref().map(str::parse).transpose()?,
    })
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn status_mark(status: Status) -> String {
    match status {
        Status::Done => "done".green().to_string(),
        Status::InProgress => "in-progress".yellow().to_string(),
        Status::NotStarted => "not-started".dimmed().to_string(),
    }
}

fn format_row(row: &ItemRow) -> String {
    let indent = "  ".repeat(row.level);
    let number = format!("{:<10}", row.number);
    let mut line = format!("{} {}{}", number.bold(), indent, row.title);
    if let Some(owner) = &row.owner {
        line.push_str(&format!("  @{}", owner));
    }
    if let Some(due) = row.due {
        line.push_str(&format!("  due {}", due));
    }
    line.push_str(&format!(
        "  [{} {}] {}",
        status_mark(row.status),
        row.priority,
        short_id(&row.id).dimmed()
    ));
    line
}

/// Render rows as a tree: each item's children are the following rows with
/// a deeper level.
fn wbs_tree(rows: &[ItemRow]) -> Tree<String> {
    fn subtrees(rows: &[ItemRow], next: &mut usize, floor: Option<usize>) -> Vec<Tree<String>> {
        let mut out = Vec::new();
        while let Some(row) = rows.get(*next) {
            if floor.is_some_and(|f| row.level <= f) {
                break;
            }
            *next += 1;
            let leaves = subtrees(rows, next, Some(row.level));
            out.push(Tree::new(format!("{} {}", row.number, row.title)).with_leaves(leaves));
        }
        out
    }

    let mut next = 0;
    Tree::new("WBS".to_string()).with_leaves(subtrees(rows, &mut next, None))
}

// ============================================================
// Deadlines
// ============================================================

fn format_deadline(d: &Deadline, today: NaiveDate) -> String {
    let days = days_until(d.date, today);
    let left = match days {
        n if n < 0 => format!("{}d ago", -n).red().to_string(),
        0 => "today".yellow().bold().to_string(),
        n => format!("in {}d", n),
    };
    format!(
        "{}  {:<40} [{}] {}  {}",
        d.date,
        d.title,
        d.category,
        left,
        short_id(&d.id).dimmed()
    )
}

#[instrument(level = "debug", skip(container))]
fn cmd_deadline(container: &ServiceContainer, command: &DeadlineCommands) -> CliResult<()> {
    let svc = &container.planner;
    let today = today();
    match command {
        DeadlineCommands::List => {
            let book = svc.load()?;
            for d in book.sorted() {
                output::info(&format_deadline(d, today));
            }
        }
        DeadlineCommands::Upcoming => {
            let summary = svc.summary(today)?;
            output::header("Dashboard");
            output::detail(&format!("Deadlines: {}", summary.total));
            output::detail(&format!(
                "Upcoming ({}d): {}",
                summary.horizon_days, summary.due_soon
            ));
            let projects = summary
                .categories
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ");
            output::detail(&format!("My Projects: {}", projects));
            output::header("Upcoming");
            for d in svc.upcoming()? {
                output::detail(&format_deadline(&d, today));
            }
        }
        DeadlineCommands::Planner => {
            for (month, deadlines) in svc.by_month()? {
                output::header(&month);
                for d in &deadlines {
                    output::detail(&format_deadline(d, today));
                }
            }
        }
        DeadlineCommands::Add {
            title,
            date,
            category,
            url,
            tags,
        } => {
            let new = NewDeadline {
                title: title.clone(),
                date: Some(parse_date(date)?),
                category: category.parse()?,
                url: url.clone(),
                tags: tags.clone(),
            };
            match svc.add(new)? {
                Some(id) => output::action("Added", &short_id(&id)),
                None => return Err(CliError::InvalidArgs("deadline needs a title".into())),
            }
        }
        DeadlineCommands::Rm { id } => {
            let removed = svc.remove(id)?;
            output::action("Removed", &removed.title);
        }
        DeadlineCommands::Ics {
            ids,
            with_wbs,
            output,
        } => {
            let outline = with_wbs.then_some(&container.outline);
            match svc.export_ics(ids, outline, Utc::now().naive_utc())? {
                Some(ics) => emit(container, output.as_deref(), &ics)?,
                None => output::warning("nothing to export"),
            }
        }
        DeadlineCommands::Slack { id } => {
            output::info(&svc.slack_reminder(id)?);
        }
    }
    Ok(())
}

// ============================================================
// Opportunities
// ============================================================

#[instrument(level = "debug", skip(container))]
fn cmd_opp(container: &ServiceContainer, command: &OppCommands) -> CliResult<()> {
    let svc = &container.opportunities;
    match command {
        OppCommands::List {
            all,
            query,
            agency,
            source,
            naics,
            tag,
        } => {
            let filter = OpportunityFilter {
                query: query.clone(),
                agency: agency.clone(),
                source: source.as_deref().map(str::parse).transpose()?,
                naics: naics.clone(),
                tag: tag.clone(),
            };
            let opps = svc.relevant(&filter, *all)?;
            if opps.is_empty() && !*all {
                output::warning("no matches for the company profile (use --all to skip it)");
            }
            let today = today();
            for o in &opps {
                output::info(&format!(
                    "{}  {} ({}, {})  due {} ({}d)  {}",
                    short_id(&o.id).dimmed(),
                    o.title.bold(),
                    o.agency,
                    o.source,
                    o.due,
                    days_until(o.due, today),
                    o.tags.join(", ")
                ));
            }
        }
        OppCommands::Facets => {
            let facets = svc.facets()?;
            output::action("Agencies", &facets.agencies.join(", "));
            let sources: Vec<String> = facets.sources.iter().map(|s| s.to_string()).collect();
            output::action("Sources", &sources.join(", "));
            output::action("NAICS", &facets.naics.join(", "));
            output::action("Tags", &facets.tags.join(", "));
        }
        OppCommands::Import { file } => {
            let added = svc.import(file, today())?;
            output::success(&format!("imported {} opportunities", added));
        }
        OppCommands::Track { id } => {
            let deadline_id = svc.track(id, &container.planner)?;
            output::action("Tracking as deadline", &short_id(&deadline_id));
        }
        OppCommands::Rm { id } => {
            let removed = svc.remove(id)?;
            output::action("Removed", &removed.title);
        }
    }
    Ok(())
}

// ============================================================
// Config
// ============================================================

fn cmd_config(
    container: &ServiceContainer,
    workspace: &Path,
    command: &ConfigCommands,
) -> CliResult<()> {
    let target = |global: bool| -> CliResult<PathBuf> {
        if global {
            global_config_path()
                .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))
        } else {
            Ok(local_config_path(workspace))
        }
    };

    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = target(*global)?;
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            write_template(container, &path)?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            let mark = |p: &Path| {
                if container.fs.exists(p) {
                    "✓".green().to_string()
                } else {
                    "✗".dimmed().to_string()
                }
            };
            if let Some(global) = global_config_path() {
                output::detail(&format!("{} global: {}", mark(&global), global.display()));
            }
            let local = local_config_path(workspace);
            output::detail(&format!("{} local:  {}", mark(&local), local.display()));
            output::detail(&format!("  data:   {}", container.settings.data_dir.display()));
        }
        ConfigCommands::Edit { global } => {
            let path = target(*global)?;
            if !container.fs.exists(&path) {
                write_template(container, &path)?;
            }
            container.editor.open(&path).map_err(|e| InfraError::Editor {
                message: e.to_string(),
            })?;
        }
    }
    Ok(())
}

fn write_template(container: &ServiceContainer, path: &Path) -> CliResult<()> {
    container
        .fs
        .ensure_parent(path)
        .and_then(|_| container.fs.write(path, &Settings::template()))
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outline, Priority};

    #[test]
    fn given_orphaned_rows_when_rendering_tree_then_orphans_attach_to_root() {
        let mut outline = Outline::proposal_template(5);
        let root = outline.items()[0].id.clone();
        outline.remove(&root);

        let tree = wbs_tree(&outline.rows()).to_string();
        let lines: Vec<&str> = tree.lines().collect();

        assert_eq!(lines[0], "WBS");
        assert!(lines[1].ends_with("1 Capture plan"));
        assert!(lines[2].ends_with("2 Technical Volume"));
        assert!(lines[3].ends_with("2.1 System architecture"));
        assert!(lines[4].ends_with("3 Submission"));
    }

    #[test]
    fn given_blank_owner_and_due_when_building_patch_then_fields_cleared() {
        let fields = ItemFields {
            owner: Some(" ".into()),
            due: Some(String::new()),
            priority: Some("p0".into()),
            ..ItemFields::default()
        };

        let patch = item_patch(&fields).unwrap();

        assert_eq!(patch.owner, Some(None));
        assert_eq!(patch.due, Some(None));
        assert_eq!(patch.priority, Some(Priority::P0));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn given_bad_date_when_building_patch_then_error() {
        let fields = ItemFields {
            due: Some("tomorrow".into()),
            ..ItemFields::default()
        };
        assert!(item_patch(&fields).is_err());
    }
}
