//! CLI entrypoint for `component-collection`.

mod cli;
mod logging;

use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use component_collection::output::{AlwaysOverwrite, NeverOverwrite, OverwriteGuard};
use component_collection::registry;
use component_collection::{
    CollectionError, CollectionTarget, Diagnostic, GenerationReport, Orchestrator, Scene, Session,
    Settings, Timestamp,
};

use crate::cli::{Args, Command, TargetFiles};

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CollectionError> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Init => init(&args.project, &mut out),
        Command::List => list(&mut out),
        Command::Collect { files, mode, root } => {
            let settings = load_settings(&args.project)?;
            let scene = Scene::load(&settings.resolve_path(&files.scene))?;
            let target_path = settings.resolve_path(&files.target);
            let mut target = CollectionTarget::load_or_default(&target_path)?;
            if let Some(node_path) = root {
                target.root = node_path;
            }
            apply_defaults(&mut target, &settings, &scene);

            let diagnostics =
                Orchestrator::new(&settings).collect(&mut target, &scene, mode.into())?;
            target.save(&target_path)?;
            for entry in &target.fields {
                emit(
                    &mut out,
                    format_args!("{} -> {}", entry.name, entry.component.node),
                )?;
            }
            summarise(&mut out, &diagnostics)
        }
        Command::Prune { files } => {
            let settings = load_settings(&args.project)?;
            let (scene, target_path, mut target) = open_target(&settings, &files)?;
            let removed = target.prune_missing(&scene);
            target.save(&target_path)?;
            for entry in &removed {
                emit(&mut out, format_args!("removed {}", entry.name))?;
            }
            Ok(())
        }
        Command::Generate {
            files,
            artifact,
            force,
        } => {
            let settings = load_settings(&args.project)?;
            let (scene, target_path, mut target) = open_target(&settings, &files)?;
            apply_defaults(&mut target, &settings, &scene);
            let report = Orchestrator::new(&settings).generate(
                &mut target,
                &scene,
                artifact.into(),
                &Timestamp::now(),
                guard(force).as_mut(),
            )?;
            target.save(&target_path)?;
            print_report(&mut out, &report)
        }
        Command::Extension { force } => {
            let settings = load_settings(&args.project)?;
            let report = Orchestrator::new(&settings)
                .generate_extension(&Timestamp::now(), guard(force).as_mut())?;
            print_report(&mut out, &report)
        }
    }
}

fn init(project: &Utf8Path, out: &mut impl Write) -> Result<(), CollectionError> {
    match Session::open(project)? {
        Session::Ready(settings) => {
            let location = settings.path().map_or_else(String::new, ToString::to_string);
            emit(out, format_args!("settings already exist at {location}"))
        }
        unconfigured @ Session::Unconfigured { .. } => {
            let settings = unconfigured.create_settings()?;
            let location = settings.path().map_or_else(String::new, ToString::to_string);
            emit(out, format_args!("created {location}"))
        }
    }
}

fn list(out: &mut impl Write) -> Result<(), CollectionError> {
    emit(out, format_args!("collectors:"))?;
    for name in registry::collectors().options() {
        emit(out, format_args!("  {name}"))?;
    }
    emit(out, format_args!("generators:"))?;
    for name in registry::generators().options() {
        emit(out, format_args!("  {name}"))?;
    }
    Ok(())
}

fn load_settings(project: &Utf8Path) -> Result<Settings, CollectionError> {
    Session::open(project)?.into_settings()
}

fn open_target(
    settings: &Settings,
    files: &TargetFiles,
) -> Result<(Scene, Utf8PathBuf, CollectionTarget), CollectionError> {
    let scene = Scene::load(&settings.resolve_path(&files.scene))?;
    let target_path = settings.resolve_path(&files.target);
    let target = CollectionTarget::load_or_default(&target_path)?;
    Ok((scene, target_path, target))
}

fn apply_defaults(target: &mut CollectionTarget, settings: &Settings, scene: &Scene) {
    let class_name = scene
        .find(&target.root)
        .and_then(|id| scene.node(id))
        .map(|node| node.name().to_owned())
        .unwrap_or_default();
    target.setup_defaults(settings, &class_name);
}

fn guard(force: bool) -> Box<dyn OverwriteGuard> {
    if force {
        Box::new(AlwaysOverwrite)
    } else {
        Box::new(NeverOverwrite)
    }
}

fn print_report(out: &mut impl Write, report: &GenerationReport) -> Result<(), CollectionError> {
    for entry in &report.pruned {
        emit(out, format_args!("pruned {}", entry.name))?;
    }
    for artifact in &report.artifacts {
        emit(out, format_args!("wrote {}", artifact.path))?;
    }
    summarise(out, &report.diagnostics)
}

fn summarise(out: &mut impl Write, diagnostics: &[Diagnostic]) -> Result<(), CollectionError> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    emit(out, format_args!("{} problem(s) skipped:", diagnostics.len()))?;
    for diagnostic in diagnostics {
        emit(out, format_args!("  {diagnostic}"))?;
    }
    Ok(())
}

fn emit(out: &mut impl Write, line: std::fmt::Arguments<'_>) -> Result<(), CollectionError> {
    writeln!(out, "{line}").map_err(CollectionError::Output)
}
