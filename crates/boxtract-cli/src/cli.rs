use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Batch-extract text from fixed regions of PDF documents.
#[derive(Debug, Parser)]
#[command(name = "boxtract", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the saved regions over every PDF in a folder and write a CSV
    Extract {
        /// Folder containing the PDF files
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        /// Region file. Default: bounding_boxes.json inside the folder
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Output CSV file. Default: extracted_text.csv inside the folder
        #[arg(long)]
        output: Option<PathBuf>,

        /// Worker thread count. Default: available parallelism
        #[arg(long)]
        workers: Option<usize>,

        /// Also write *_annotated.pdf copies with the regions drawn in
        #[arg(long)]
        annotate: bool,
    },

    /// Maintain a region file without the interactive editor
    Regions {
        #[command(subcommand)]
        command: RegionsCommand,
    },
}

/// Region-file maintenance subcommands.
#[derive(Debug, Subcommand)]
pub enum RegionsCommand {
    /// Add a region, replacing any existing region with the same name
    Add {
        /// Region file (created if missing)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Region name (becomes the CSV column header)
        name: String,

        /// Corner coordinates in page points, bottom-left origin
        #[arg(num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"], allow_negative_numbers = true)]
        coords: Vec<f64>,
    },

    /// List the regions in a file
    List {
        /// Region file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove a region by name
    Remove {
        /// Region file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Region name
        name: String,
    },
}
