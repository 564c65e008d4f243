//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Planning for govcon startups: work-breakdown structure, deadlines and opportunities
#[derive(Parser, Debug)]
#[command(name = "trackops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Workspace directory for local config and relative data_dir (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Edit the work-breakdown structure
    Wbs {
        #[command(subcommand)]
        command: WbsCommands,
    },

    /// Plan deadlines
    Deadline {
        #[command(subcommand)]
        command: DeadlineCommands,
    },

    /// Browse funding opportunities
    Opp {
        #[command(subcommand)]
        command: OppCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format for `wbs export`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Ics,
}

/// Field edits shared by `wbs set`.
#[derive(Args, Debug, Default)]
pub struct ItemFields {
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// Owner (empty string clears)
    #[arg(long)]
    pub owner: Option<String>,
    /// Due date YYYY-MM-DD (empty string clears)
    #[arg(long)]
    pub due: Option<String>,
    /// not-started | in-progress | done
    #[arg(long)]
    pub status: Option<String>,
    /// P0 | P1 | P2
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum WbsCommands {
    /// Show the outline with computed numbers
    List {
        /// Render as a tree
        #[arg(long)]
        tree: bool,
    },

    /// Seed an empty outline with the proposal template
    Init,

    /// Append a root-level item
    Add {
        /// Title
        title: String,
    },

    /// Insert a sibling after an item
    Sibling {
        /// Item id, id prefix or number (e.g. 1.2)
        after: String,
        /// Title
        #[arg(default_value = "")]
        title: String,
    },

    /// Insert a child after an item
    Child {
        /// Item id, id prefix or number (e.g. 1.2)
        after: String,
        /// Title
        #[arg(default_value = "")]
        title: String,
    },

    /// Indent an item (one level deeper)
    Indent {
        /// Item id, id prefix or number
        item: String,
        /// Number of levels
        #[arg(short, long, default_value_t = 1)]
        times: u8,
    },

    /// Outdent an item (one level shallower)
    Outdent {
        /// Item id, id prefix or number
        item: String,
        /// Number of levels
        #[arg(short, long, default_value_t = 1)]
        times: u8,
    },

    /// Delete an item (children stay in place)
    Rm {
        /// Item id, id prefix or number
        item: String,
    },

    /// Update item fields
    Set {
        /// Item id, id prefix or number
        item: String,
        #[command(flatten)]
        fields: ItemFields,
    },

    /// Replay editor keys (enter, tab, shift-tab, backspace, up, down)
    Keys {
        /// Starting item (default: first item)
        #[arg(short, long)]
        at: Option<String>,
        /// Title typed into the focused item afterwards
        #[arg(short, long)]
        title: Option<String>,
        /// Keys to press in order
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Paste tab/comma separated text into the table (reads stdin without --text)
    Paste {
        /// Zero-based row
        #[arg(long, default_value_t = 0)]
        row: usize,
        /// Zero-based column (0=title, 1=owner, 2=due, 3=status, 4=priority)
        #[arg(long, default_value_t = 0)]
        col: usize,
        /// Clipboard text
        #[arg(long)]
        text: Option<String>,
    },

    /// Append items from a CSV/TSV file
    Import {
        /// CSV or TSV file with a header row
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Export the outline
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeadlineCommands {
    /// List all deadlines by date
    List,

    /// Dashboard: counts and the next deadlines
    Upcoming,

    /// Deadlines grouped by month
    Planner,

    /// Add a deadline
    Add {
        /// Title
        title: String,
        /// Date YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        /// govcon | product | fundraise
        #[arg(short, long, default_value = "govcon")]
        category: String,
        /// Link
        #[arg(short, long)]
        url: Option<String>,
        /// Tags (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Delete a deadline
    Rm {
        /// Deadline id or id prefix
        id: String,
    },

    /// Export deadlines as an .ics calendar
    Ics {
        /// Deadline ids (default: all)
        ids: Vec<String>,
        /// Also include dated WBS items
        #[arg(long)]
        with_wbs: bool,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print a Slack webhook curl command for a deadline
    Slack {
        /// Deadline id or id prefix
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum OppCommands {
    /// List opportunities relevant to the company profile
    List {
        /// Skip the company profile match
        #[arg(short, long)]
        all: bool,
        /// Text search in title, topic and keywords
        #[arg(short, long)]
        query: Option<String>,
        /// Agency
        #[arg(long)]
        agency: Option<String>,
        /// AFWERX | DSIP | SAM | Other
        #[arg(long)]
        source: Option<String>,
        /// NAICS code
        #[arg(long)]
        naics: Option<String>,
        /// Tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show filter values present in the catalog
    Facets,

    /// Import opportunities from CSV
    Import {
        /// CSV with columns title,agency,source,topic,naics,keywords,url,due,tags
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Add an opportunity's due date to the planner
    Track {
        /// Opportunity id or id prefix
        id: String,
    },

    /// Delete an opportunity
    Rm {
        /// Opportunity id or id prefix
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,

    /// Edit config file
    Edit {
        /// Edit global config
        #[arg(short, long)]
        global: bool,
    },
}
