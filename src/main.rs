use clap::Parser;
use dialoguer::Confirm;
use fishrename::cli::{Args, Command, IdentificationArgs};
use fishrename::config::{config_from_env, Config};
use fishrename::error::AppError;
use fishrename::fields::{shared_fields, EditRequest, FieldSet, Identification, Mode};
use fishrename::logging;
use fishrename::metadata::ExifToolMetadata;
use fishrename::output::{
    display_blocked, display_dry_run, display_execution_result, display_inspection,
    display_species, display_undo_result,
};
use fishrename::pipeline::{self, BasicInput, MetaInput, Plan, Planner};
use fishrename::progress::Progress;
use fishrename::reference::{LabelCategory, ReferenceData};
use fishrename::rename::{CancelToken, RenameEngine};
use fishrename::scanner::collect_images;
use fishrename::undo::{UndoManager, UndoResult};
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, info};

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

/// Flags that apply to every renaming command
struct RunOptions {
    dry: bool,
    review: bool,
    verbose: u8,
}

fn output_error(e: io::Error) -> AppError {
    AppError::Other(format!("Failed to display output: {}", e))
}

fn run(args: Args) -> Result<(), AppError> {
    let config = config_from_env()?.with_overrides(args.data_dir, args.location);
    config.check()?;
    debug!("Data directory: {:?}, location: {:?}", config.data_dir, config.location);

    let options = RunOptions {
        dry: args.dry,
        review: args.review,
        verbose: args.verbose,
    };

    match args.command {
        Command::Search { terms } => search(&config, &terms),
        Command::Inspect { files } => inspect(&files.paths),
        command => rename(&config, &options, command),
    }
}

fn load_reference(config: &Config, progress: &mut Progress) -> Result<ReferenceData, AppError> {
    let refs = ReferenceData::load(&config.reference_paths(), config.location.as_deref())?;
    for path in &refs.missing {
        progress.warn(&format!("Reference file not found: {}", path.display()));
    }
    Ok(refs)
}

fn search(config: &Config, terms: &[String]) -> Result<(), AppError> {
    let mut progress = Progress::new();
    let refs = load_reference(config, &mut progress)?;
    let results = refs.search_species(&terms.join(" "));
    info!("{} species match {:?}", results.len(), terms);

    if results.is_empty() {
        progress.warn("No species match the search terms");
    }
    display_species(&results, &mut io::stdout()).map_err(output_error)
}

fn inspect(paths: &[PathBuf]) -> Result<(), AppError> {
    let images = collect_images(paths)?;
    let rows = pipeline::inspect(&images);
    let parsed: Vec<FieldSet> = rows.iter().filter_map(|(_, _, fields)| fields.clone()).collect();
    let shared = shared_fields(&parsed);

    display_inspection(&rows, &shared, &mut io::stdout()).map_err(output_error)
}

fn label(refs: &ReferenceData, category: LabelCategory, input: &Option<String>) -> Option<String> {
    input
        .as_ref()
        .map(|value| refs.resolve_label(category, value).unwrap_or_else(|| value.clone()))
}

fn identification_from(refs: &ReferenceData, args: &IdentificationArgs) -> Identification {
    Identification {
        family: args.family.clone(),
        genus: args.genus.clone(),
        species: args.species.clone(),
        confidence: args.confidence,
        life_stage: label(refs, LabelCategory::Phase, &args.stage),
        color_variant: label(refs, LabelCategory::Colour, &args.colour),
        behavior: label(refs, LabelCategory::Behaviour, &args.behaviour),
    }
}

fn photographer_code(refs: &ReferenceData, input: &str) -> String {
    refs.resolve_photographer(input)
        .map(|p| p.code.clone())
        .unwrap_or_else(|| input.to_string())
}

fn site_code(refs: &ReferenceData, input: &str) -> String {
    refs.resolve_site(input)
        .map(|s| s.code.clone())
        .unwrap_or_else(|| input.to_string())
}

fn build_plan(planner: &Planner, refs: &ReferenceData, command: Command) -> Result<Plan, AppError> {
    let plan = match command {
        Command::Basic {
            files,
            photographer,
            site,
            activity,
        } => {
            let images = collect_images(&files.paths)?;
            let input = BasicInput {
                photographer_code: photographer_code(refs, &photographer),
                site_code: site_code(refs, &site),
                activity_code: activity,
            };
            planner.plan_basic(&images, &input)
        }

        Command::Identify {
            files,
            identification,
        } => {
            let images = collect_images(&files.paths)?;
            planner.plan_identify(&images, &identification_from(refs, &identification))
        }

        Command::Edit {
            files,
            photographer,
            site,
            activity,
            identification,
        } => {
            let ident = identification_from(refs, &identification);
            let edits = EditRequest {
                photographer_code: photographer.map(|p| photographer_code(refs, &p)),
                site_code: site.map(|s| site_code(refs, &s)),
                activity_code: activity,
                family: ident.family,
                genus: ident.genus,
                species: ident.species,
                confidence: ident.confidence,
                life_stage: ident.life_stage,
                color_variant: ident.color_variant,
                behavior: ident.behavior,
            };
            if edits.is_empty() {
                return Err(AppError::InvalidArguments(
                    "Nothing to edit: give at least one field to change".to_string(),
                ));
            }
            let images = collect_images(&files.paths)?;
            planner.plan_edit(&images, &edits)
        }

        Command::Meta {
            files,
            site,
            camera,
        } => {
            let images = collect_images(&files.paths)?;
            let input = MetaInput {
                fallback_site: site.map(|s| site_code(refs, &s)),
                camera_tag: camera.map(|c| refs.resolve_camera(&c).unwrap_or(c)),
            };
            planner.plan_meta(&images, &input)
        }

        Command::Inspect { .. } | Command::Search { .. } => {
            return Err(AppError::InvalidArguments(
                "This command does not rename files".to_string(),
            ))
        }
    };
    Ok(plan)
}

fn rename(config: &Config, options: &RunOptions, command: Command) -> Result<(), AppError> {
    let mut progress = Progress::for_verbosity(options.verbose);
    let mut stdout = io::stdout();

    let refs = load_reference(config, &mut progress)?;
    let metadata = ExifToolMetadata::new(config.exiftool.clone());
    let planner = Planner::new(&refs, &metadata);

    let mut plan = build_plan(&planner, &refs, command)?;
    let total = plan.items.len();
    info!(
        "{} plan: {} ready, {} blocked",
        plan.mode.description(),
        plan.ready_count(),
        plan.blocked_count()
    );

    if options.dry {
        display_dry_run(&plan, &mut stdout).map_err(output_error)?;
        if plan.ready_count() == 0 {
            return Err(AppError::NothingToRename { total });
        }
        return Ok(());
    }

    display_blocked(&plan, &mut stdout).map_err(output_error)?;
    if plan.ready_count() == 0 {
        return Err(AppError::NothingToRename { total });
    }

    if plan.mode == Mode::Meta {
        let pending = plan.ready_count();
        progress.gps_start(pending);
        let written = planner.apply_gps(&mut plan);
        progress.gps_complete(written, pending);
        if written == 0 {
            return Err(AppError::MetadataFailed { failed: pending });
        }
    }

    // Files refused before the engine ran (validation, GPS write)
    let refused = plan
        .items
        .iter()
        .filter(|i| i.skipped.is_none() && !i.is_ready())
        .count();

    let engine = RenameEngine::default();
    let operations = plan.operations();
    let outcome = engine.execute_with(&operations, &CancelToken::new(), |current, count, file| {
        progress.file_done(current, count, file)
    })?;

    display_execution_result(&outcome, &mut stdout).map_err(output_error)?;
    progress.batch_complete(outcome.committed());

    let mut undo = UndoManager::new();
    if undo.record(outcome.record.clone()) && options.review {
        review(&engine, &mut undo, &mut progress)?;
    }

    let failed = outcome.failed() + refused;
    if outcome.committed() == 0 && outcome.failed() > 0 {
        return Err(AppError::RenameFailed {
            failed: outcome.failed(),
        });
    }
    if failed > 0 {
        return Err(AppError::PartialFailure { failed, total });
    }
    Ok(())
}

/// Offer to reverse the batch that just ran
fn review(
    engine: &RenameEngine,
    undo: &mut UndoManager,
    progress: &mut Progress,
) -> Result<(), AppError> {
    let confirmed = Confirm::new()
        .with_prompt("Undo this batch?")
        .default(false)
        .interact()
        .map_err(|e| AppError::Other(format!("Prompt failed: {}", e)))?;
    if !confirmed {
        return Ok(());
    }

    if let Some(record) = undo.last() {
        progress.undo_start(
            record.len(),
            &record.executed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
    }
    let result = undo.undo(engine)?;
    display_undo_result(&result, &mut io::stdout()).map_err(output_error)?;

    if let UndoResult::Partial { failed, .. } = &result {
        progress.warn(&format!("{} files could not be restored", failed.len()));
    }
    Ok(())
}
