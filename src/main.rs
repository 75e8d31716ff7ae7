use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uplift::migration::{
    load_from_path, CodegenStatus, MigrationPlan, MigrationReport, Migrator, RecordingRunner,
    StepAction, StepOutcome,
};
use uplift::vfs::{DiskTree, FileChange, FileTree};

#[derive(Parser)]
#[command(name = "uplift")]
#[command(about = "Structural migrations for TypeScript/HTML applications", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a migration plan to a project
    Apply {
        /// Path to project root
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Migration plan (TOML)
        #[arg(long)]
        plan: PathBuf,

        /// Do not run the plan's code generation command
        #[arg(long)]
        skip_codegen: bool,

        /// Run even if the installed version is outside the plan's range
        #[arg(long)]
        force: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Show what a plan would change without touching the project
    Check {
        /// Path to project root
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Migration plan (TOML)
        #[arg(long)]
        plan: PathBuf,

        /// Run even if the installed version is outside the plan's range
        #[arg(long)]
        force: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List the steps of a migration plan
    List {
        /// Migration plan (TOML)
        #[arg(long)]
        plan: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uplift=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            project,
            plan,
            skip_codegen,
            force,
            diff,
        } => cmd_apply(&project, &plan, skip_codegen, force, diff),

        Commands::Check {
            project,
            plan,
            force,
            diff,
        } => cmd_check(&project, &plan, force, diff),

        Commands::List { plan } => cmd_list(&plan),
    }
}

fn cmd_apply(project: &Path, plan_path: &Path, skip_codegen: bool, force: bool, show_diff: bool) -> Result<()> {
    let plan = load_from_path(plan_path)?;
    let mut tree = DiskTree::open(project)
        .with_context(|| format!("cannot open project {}", project.display()))?;

    println!("Project: {}", tree.root().display());
    println!("Plan: {}", plan_title(&plan));
    println!();

    let mut migrator = Migrator::new(plan)?
        .with_project_root(tree.root().to_path_buf())
        .skip_codegen(skip_codegen)
        .force(force);
    let report = migrator.run(&mut tree)?;

    print_report(&report, false);
    if show_diff {
        print_changes(&tree.changes());
    }
    print_summary(&report);

    if report.has_failures() || report.skipped_version.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_check(project: &Path, plan_path: &Path, force: bool, show_diff: bool) -> Result<()> {
    let plan = load_from_path(plan_path)?;
    let disk = DiskTree::open(project)
        .with_context(|| format!("cannot open project {}", project.display()))?;
    let mut snapshot = disk.snapshot();

    println!("Project: {}", disk.root().display());
    println!("Plan: {}", plan_title(&plan));
    println!("{}", "[CHECK - project files are not modified]".cyan());
    println!();

    let mut migrator = Migrator::new(plan)?
        .with_runner(RecordingRunner::default())
        .force(force);
    let report = migrator.run(&mut snapshot)?;

    print_report(&report, true);
    for command in &migrator.runner().commands {
        println!("{} would run `{}`", "⊙".yellow(), command);
    }
    if show_diff {
        print_changes(&snapshot.changes());
    }
    print_summary(&report);

    if report.has_failures() || report.skipped_version.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(plan_path: &Path) -> Result<()> {
    let plan = load_from_path(plan_path)?;

    println!("{}", plan_title(&plan).bold());
    if let Some(description) = &plan.meta.description {
        println!("{}", description.dimmed());
    }
    if let Some(package) = &plan.meta.package {
        println!(
            "Applies to: {} {}",
            package,
            plan.meta.version_range.as_deref().unwrap_or("(any version)")
        );
    }
    println!();

    for update in &plan.dependencies.update {
        match &update.from {
            Some(from) => println!("  update {} {} -> {}", update.name, from, update.to),
            None => println!("  update {} -> {}", update.name, update.to),
        }
    }
    for name in &plan.dependencies.remove {
        println!("  remove {name}");
    }
    if let Some(command) = &plan.codegen {
        println!("  run `{command}`");
    }
    for step in &plan.steps {
        let summary = match &step.description {
            Some(description) => description.clone(),
            None => describe_action(&step.action),
        };
        println!(
            "  {} {} {}",
            step.id.bold(),
            format!("[{}]", step.action.kind()).cyan(),
            summary
        );
    }
    Ok(())
}

fn plan_title(plan: &MigrationPlan) -> String {
    if plan.meta.name.is_empty() {
        "(unnamed plan)".to_string()
    } else {
        plan.meta.name.clone()
    }
}

fn describe_action(action: &StepAction) -> String {
    match action {
        StepAction::RenameSymbol { module, from, to } => format!("{from} -> {to} ({module})"),
        StepAction::RenameMarkupTag { from, to } => format!("<{from}> -> <{to}>"),
        StepAction::StripPackageReferences { package, .. } => format!("drop references to {package}"),
        StepAction::WarnUsages { message, .. } => message.clone(),
        StepAction::InjectRegistration {
            decorator,
            when_references,
            entry,
            ..
        } => format!("register {entry} in @{decorator} referencing {when_references}"),
        StepAction::RemoveConstructorParameters { types } => {
            format!("drop constructor parameters of type {}", types.join(", "))
        }
        StepAction::AddImport {
            module, specifier, ..
        } => format!("import {specifier} from {module}"),
        StepAction::IgnoreEntry { file, .. } => format!("edit {file}"),
    }
}

fn print_report(report: &MigrationReport, dry_run: bool) {
    if let Some(reason) = &report.skipped_version {
        println!("{} Skipped ({})", "⊘".cyan(), reason);
        return;
    }

    for step in &report.outcomes {
        match &step.outcome {
            StepOutcome::Completed {
                changed,
                failed_files,
            } => {
                let verb = if dry_run { "Would change" } else { "Changed" };
                if changed.is_empty() {
                    println!("{} {}: nothing to change", "⊙".yellow(), step.id);
                } else {
                    println!("{} {}: {} {} file(s)", "✓".green(), step.id, verb, changed.len());
                    for path in changed {
                        println!("    {}", path.display().to_string().dimmed());
                    }
                }
                for path in failed_files {
                    eprintln!("  {} could not process {}", "✗".red(), path.display());
                }
            }
            StepOutcome::Skipped { reason } => {
                println!("{} {}: Skipped ({})", "⊘".cyan(), step.id, reason);
            }
            StepOutcome::Failed { reason } => {
                eprintln!("{} {}: Failed - {}", "✗".red(), step.id, reason);
            }
        }
    }

    match report.codegen {
        CodegenStatus::Ran if !dry_run => println!("{} code generation ran", "✓".green()),
        CodegenStatus::Skipped => println!("{} code generation skipped", "⊘".cyan()),
        _ => {}
    }

    for warning in &report.warnings {
        if let Some(line) = warning.render() {
            println!("{} {}", "!".yellow().bold(), line.yellow());
        }
    }
}

fn print_summary(report: &MigrationReport) {
    let changed = report.changed_files().len();
    let failed = report.failures().count();
    let skipped = report
        .outcomes
        .iter()
        .filter(|step| matches!(step.outcome, StepOutcome::Skipped { .. }))
        .count();

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} files changed", format!("{}", changed).green());
    println!("  {} steps skipped", format!("{}", skipped).cyan());
    println!("  {} steps failed", format!("{}", failed).red());
    println!("  {} warnings", format!("{}", report.warnings.len()).yellow());
}

fn print_changes(changes: &[FileChange]) {
    for change in changes {
        display_diff(&change.path, change.before.as_deref().unwrap_or(""), &change.after);
    }
}

/// Helper: Show unified diff between original and migrated content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (migrated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
