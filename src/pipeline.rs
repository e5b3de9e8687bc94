//! Per-file planning: turns scanned images plus user input into previewable
//! rename plans, and runs the GPS step for Meta mode.

use crate::fields::{shared_fields, EditRequest, Field, FieldSet, Identification, Mode, Timestamp};
use crate::grammar::{self, Layout};
use crate::metadata::MetadataSource;
use crate::reference::ReferenceLookup;
use crate::rename::RenameOperation;
use crate::scanner::ImageEntry;
use crate::validator::{validate, ValidationReport};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Values applied to every file in Basic mode (already resolved to codes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicInput {
    pub photographer_code: String,
    pub site_code: String,
    pub activity_code: String,
}

/// Values for Meta mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaInput {
    /// Used when the filename carries no site string
    pub fallback_site: Option<String>,
    pub camera_tag: Option<String>,
}

/// The plan for one file, shown before anything is touched
#[derive(Debug, Clone)]
pub struct PlanItem {
    pub source_path: PathBuf,
    pub source_name: String,
    pub fields: Option<FieldSet>,
    pub target_name: Option<String>,
    pub report: ValidationReport,
    /// Why the file is left alone (wrong layout, already processed)
    pub skipped: Option<String>,
    /// Coordinates to embed before renaming (Meta mode)
    pub gps: Option<(f64, f64)>,
    /// Site the coordinates come from, e.g. "IDN-Bangka-HRS (Bangka, Hairball)"
    pub gps_site: Option<String>,
}

impl PlanItem {
    fn new(entry: &ImageEntry) -> Self {
        Self {
            source_path: entry.path.clone(),
            source_name: entry.name.clone(),
            fields: None,
            target_name: None,
            report: ValidationReport::new(),
            skipped: None,
            gps: None,
            gps_site: None,
        }
    }

    fn skip(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(file = %self.source_name, %reason, "Skipping file");
        self.skipped = Some(reason);
        self
    }

    /// Validate and, when clean, assemble the target name
    fn finish(mut self, fields: FieldSet, mode: Mode, refs: &dyn ReferenceLookup) -> Self {
        self.report.extend(validate(&fields, mode, refs));
        if self.report.is_ok() {
            match grammar::assemble(&fields, mode) {
                Ok(name) => self.target_name = Some(name),
                Err(e) => self.report.error(Field::OriginalStem, e.to_string()),
            }
        }
        self.fields = Some(fields);
        self
    }

    pub fn target_path(&self) -> Option<PathBuf> {
        self.target_name
            .as_ref()
            .map(|name| self.source_path.with_file_name(name))
    }

    /// Has a target name and no blocking diagnostics
    pub fn is_ready(&self) -> bool {
        self.skipped.is_none() && self.target_name.is_some() && self.report.is_ok()
    }

    pub fn operation(&self, mode: Mode) -> Option<RenameOperation> {
        if !self.is_ready() {
            return None;
        }
        Some(RenameOperation::new(
            self.source_path.clone(),
            self.target_name.clone()?,
            mode,
            self.fields.clone()?,
        ))
    }
}

/// A previewable set of per-file plans
#[derive(Debug, Clone)]
pub struct Plan {
    pub mode: Mode,
    pub items: Vec<PlanItem>,
}

impl Plan {
    /// Finish a plan: targets that exist on disk, or that an earlier item
    /// already claims, are blocked before anything is touched
    pub fn new(mode: Mode, mut items: Vec<PlanItem>) -> Self {
        let mut claimed = HashSet::new();
        for item in items.iter_mut().filter(|i| i.is_ready()) {
            let Some(target) = item.target_path() else {
                continue;
            };
            if target == item.source_path {
                claimed.insert(target);
                continue;
            }

            let name = item.target_name.clone().unwrap_or_default();
            if claimed.contains(&target) {
                item.report.error(
                    Field::Target,
                    format!("'{}' is already the target of another file in this batch", name),
                );
            } else if target.symlink_metadata().is_ok() {
                item.report
                    .error(Field::Target, format!("'{}' already exists", name));
            }
            if item.report.has_errors() {
                debug!(file = %item.source_name, target = %name, "Target collision");
            }
            claimed.insert(target);
        }

        Self { mode, items }
    }

    pub fn ready(&self) -> impl Iterator<Item = &PlanItem> {
        self.items.iter().filter(|i| i.is_ready())
    }

    pub fn ready_count(&self) -> usize {
        self.ready().count()
    }

    pub fn blocked_count(&self) -> usize {
        self.items.len() - self.ready_count()
    }

    pub fn operations(&self) -> Vec<RenameOperation> {
        self.items
            .iter()
            .filter_map(|item| item.operation(self.mode))
            .collect()
    }
}

pub struct Planner<'a> {
    refs: &'a dyn ReferenceLookup,
    metadata: &'a dyn MetadataSource,
}

impl<'a> Planner<'a> {
    pub fn new(refs: &'a dyn ReferenceLookup, metadata: &'a dyn MetadataSource) -> Self {
        Self { refs, metadata }
    }

    /// Raw camera files -> Basic names
    pub fn plan_basic(&self, files: &[ImageEntry], input: &BasicInput) -> Plan {
        let items = files
            .iter()
            .map(|entry| {
                let item = PlanItem::new(entry);
                if let Some(layout) = grammar::detect_layout(&entry.name) {
                    return item.skip(format!("Already processed ({:?} name)", layout));
                }

                let (stem, extension) = grammar::split_extension(&entry.name);
                let timestamp = self.metadata.read_capture_timestamp(&entry.path);

                let mut fields = FieldSet {
                    photographer_code: Some(input.photographer_code.clone()),
                    site_code: Some(input.site_code.clone()),
                    timestamp: timestamp.as_ref().ok().map(|t| Timestamp::from_datetime(*t)),
                    activity_code: Some(input.activity_code.clone()),
                    original_stem: Some(grammar::sanitize_stem(stem)),
                    extension: extension.map(str::to_string),
                    ..Default::default()
                };
                if fields.original_stem.as_deref() == Some("") {
                    fields.original_stem = None;
                }

                let mut item = item.finish(fields, Mode::Basic, self.refs);
                if let Err(e) = timestamp {
                    warn!("{}: {}", entry.name, e);
                    item.report.diagnostics.retain(|d| d.field != Field::Timestamp);
                    item.report.error(Field::Timestamp, e.to_string());
                }
                item
            })
            .collect();

        Plan::new(Mode::Basic, items)
    }

    /// Basic names -> Identify names
    pub fn plan_identify(&self, files: &[ImageEntry], identification: &Identification) -> Plan {
        let items = files
            .iter()
            .map(|entry| {
                let item = PlanItem::new(entry);
                if grammar::parse(&entry.name, Mode::Identify).is_ok() {
                    return item.skip("Already identified");
                }
                match grammar::parse(&entry.name, Mode::Basic) {
                    Ok(fields) => item.finish(
                        fields.with_identification(identification.clone()),
                        Mode::Identify,
                        self.refs,
                    ),
                    Err(e) => item.skip(format!("Not a Basic name: {}", e)),
                }
            })
            .collect();

        Plan::new(Mode::Identify, items)
    }

    /// Change selected slots of Basic or Identify names
    pub fn plan_edit(&self, files: &[ImageEntry], edits: &EditRequest) -> Plan {
        let parsed: Vec<_> = files
            .iter()
            .map(|entry| grammar::parse(&entry.name, Mode::Edit))
            .collect();

        let selection: Vec<FieldSet> = parsed.iter().filter_map(|p| p.as_ref().ok()).cloned().collect();
        let shared = shared_fields(&selection);
        let edited = edits.edited_fields();

        let items = files
            .iter()
            .zip(parsed)
            .map(|(entry, parsed)| {
                let mut item = PlanItem::new(entry);
                let mut fields = match parsed {
                    Ok(fields) => fields,
                    Err(e) => return item.skip(format!("Cannot be parsed for editing: {}", e)),
                };

                if !fields.is_identified() && edits.touches_identification() {
                    item.report.error(
                        Field::Family,
                        "Identification cannot be edited on a Basic name; use identify first",
                    );
                }
                for field in &edited {
                    if selection.len() > 1 && !shared.contains_key(field) {
                        item.report.warning(
                            *field,
                            "Differs across the selected files; all will get the new value",
                        );
                    }
                }

                fields.apply_edits(edits);
                item.finish(fields, Mode::Edit, self.refs)
            })
            .collect();

        Plan::new(Mode::Edit, items)
    }

    /// Add the GPS marker and camera tag, with coordinates from the site
    pub fn plan_meta(&self, files: &[ImageEntry], input: &MetaInput) -> Plan {
        let items = files
            .iter()
            .map(|entry| {
                let mut item = PlanItem::new(entry);
                let mut fields = match grammar::parse(&entry.name, Mode::Meta) {
                    Ok(fields) => fields,
                    Err(e) => return item.skip(e.to_string()),
                };

                if fields.site_code.is_none() {
                    fields.site_code = input.fallback_site.clone();
                }
                if let Some(camera) = &input.camera_tag {
                    fields.camera_tag = Some(camera.clone());
                }
                // The marker is only used once the write is confirmed
                fields.gps_marker = true;

                let site = fields.site_code.as_deref().and_then(|code| self.refs.site(code));
                item.gps = site.and_then(|site| site.coordinates());
                item.gps_site = fields.site_code.as_ref().map(|code| match site {
                    Some(site) => format!("{} ({})", code, site.display_name()),
                    None => code.clone(),
                });

                item.finish(fields, Mode::Meta, self.refs)
            })
            .collect();

        Plan::new(Mode::Meta, items)
    }

    /// Write GPS for every ready item. A failed write blocks that file's rename.
    pub fn apply_gps(&self, plan: &mut Plan) -> usize {
        let mut written = 0;
        for item in plan.items.iter_mut().filter(|i| i.is_ready()) {
            let Some((latitude, longitude)) = item.gps else {
                continue;
            };
            match self.metadata.write_gps(&item.source_path, latitude, longitude) {
                Ok(()) => {
                    info!("GPS written to {}", item.source_name);
                    written += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    item.report.error(Field::GpsMarker, e.to_string());
                }
            }
        }
        written
    }
}

/// Which layout each file follows, for the inspect command
pub fn inspect(files: &[ImageEntry]) -> Vec<(String, Option<Layout>, Option<FieldSet>)> {
    files
        .iter()
        .map(|entry| {
            let layout = grammar::detect_layout(&entry.name);
            let fields = layout.and_then(|_| grammar::parse(&entry.name, Mode::Edit).ok());
            (entry.name.clone(), layout, fields)
        })
        .collect()
}
