use crate::fields::Confidence;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fishrename")]
#[command(author, version, long_about = None)]
#[command(about = "Rename underwater photos by photographer, dive site, date and species")]
pub struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Show the planned renames without touching any file
    #[arg(short, long, global = true)]
    pub dry: bool,

    /// Offer to undo the batch right after it ran
    #[arg(short, long, global = true)]
    pub review: bool,

    /// Directory holding the reference files (overrides FISHRENAME_DATA_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Location filter for species and dive sites (overrides FISHRENAME_LOCATION)
    #[arg(short, long, global = true)]
    pub location: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Give raw camera files a Basic name from photographer, site, capture time and activity
    Basic {
        #[command(flatten)]
        files: FileArgs,

        /// Photographer name code or full name
        #[arg(short, long)]
        photographer: String,

        /// Site string or "Area, Site"
        #[arg(short, long)]
        site: String,

        /// Activity code (e.g. dive, snork)
        #[arg(short, long)]
        activity: String,
    },

    /// Prefix Basic names with a species identification
    Identify {
        #[command(flatten)]
        files: FileArgs,

        #[command(flatten)]
        identification: IdentificationArgs,
    },

    /// Change slots of already processed names
    Edit {
        #[command(flatten)]
        files: FileArgs,

        #[arg(long)]
        photographer: Option<String>,

        #[arg(long)]
        site: Option<String>,

        #[arg(long)]
        activity: Option<String>,

        #[command(flatten)]
        identification: IdentificationArgs,
    },

    /// Write GPS coordinates of the dive site and tag names with the GPS marker
    Meta {
        #[command(flatten)]
        files: FileArgs,

        /// Site used when the name carries none
        #[arg(short, long)]
        site: Option<String>,

        /// Camera tag or camera model name
        #[arg(short, long)]
        camera: Option<String>,
    },

    /// Show the layout of each file and the fields shared by all of them
    Inspect {
        #[command(flatten)]
        files: FileArgs,
    },

    /// Search the species list (all terms must match)
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct FileArgs {
    /// Image files or directories of images
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct IdentificationArgs {
    #[arg(long)]
    pub family: Option<String>,

    #[arg(long)]
    pub genus: Option<String>,

    #[arg(long)]
    pub species: Option<String>,

    /// ok, cf or no
    #[arg(long, value_parser = parse_confidence)]
    pub confidence: Option<Confidence>,

    /// Life stage code or label
    #[arg(long)]
    pub stage: Option<String>,

    /// Colour variant code or label
    #[arg(long)]
    pub colour: Option<String>,

    /// Behaviour code or label
    #[arg(long)]
    pub behaviour: Option<String>,
}

fn parse_confidence(value: &str) -> Result<Confidence, String> {
    Confidence::from_code(value)
        .ok_or_else(|| format!("'{}' is not a confidence code (ok, cf, no)", value))
}
