use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments for `StudyMate`
#[derive(Debug, Parser)]
#[command(name = "studymate")]
#[command(about = "Answer questions from your study documents", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.studymate/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Selected subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the default configuration file
    #[command(about = "Write the default configuration file")]
    Init {
        /// Replace an existing file
        #[arg(long, help = "Overwrite an existing configuration")]
        force: bool,
    },

    /// Index documents and show the chunks nearest to a query
    #[command(about = "Index documents and show the chunks nearest to a query")]
    Search {
        /// Documents to index
        #[arg(required = true, help = "Text documents to index")]
        files: Vec<PathBuf>,

        /// Query text
        #[arg(short, long, help = "Text to search for")]
        query: String,

        /// Number of chunks to return
        #[arg(short = 'k', long, help = "Number of chunks to return (overrides config)")]
        top_k: Option<usize>,

        /// Emit JSON instead of text
        #[arg(long, help = "Print results as JSON")]
        json: bool,
    },

    /// Index documents and answer a question from them
    #[command(about = "Index documents and answer a question from them")]
    Ask {
        /// Documents to index
        #[arg(required = true, help = "Text documents to index")]
        files: Vec<PathBuf>,

        /// Question to answer
        #[arg(short, long, help = "Question to answer")]
        question: String,

        /// Number of chunks given to the generator
        #[arg(short = 'k', long, help = "Number of chunks used as context (overrides config)")]
        top_k: Option<usize>,

        /// Emit JSON instead of text
        #[arg(long, help = "Print the answer as JSON")]
        json: bool,
    },
}
