use clap::{Parser, Subcommand};
use photo_grid::document::PdfWriter;
use photo_grid::imaging::{RustBackend, is_supported_image};
use photo_grid::layout::LayoutMode;
use photo_grid::slots::Coordinate;
use photo_grid::store::PhotoRef;
use photo_grid::{config, output, project, render};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "photo-grid")]
#[command(about = "Lay out photos on grid pages and export them as a PDF")]
#[command(long_about = "\
Lay out photos on grid pages and export them as a PDF

Photos are placed in the order they were added, filling each page in
reading order. A page holds two photos stacked vertically (2x1) or four
in a square (2x2). Every photo gets a caption, numbered from the caption
prefix unless you write your own, and every page gets a title.

Typical session:

  photo-grid add ~/site-visit/             # add a folder of photos
  photo-grid title --page 1 \"Ground floor\"
  photo-grid caption --page 1 --slot 2 \"Cracked lintel\"
  photo-grid show                         # preview the current page
  photo-grid export --name inspection     # → Documents/inspection.pdf

Pages and slots are numbered from 1. Run 'photo-grid gen-config' to
generate a documented settings.toml.")]
#[command(version)]
struct Cli {
    /// Project file holding photos, assignments and titles
    #[arg(long, default_value = "photo-grid.json", global = true)]
    project: PathBuf,

    /// Directory containing settings.toml
    #[arg(long, default_value = ".photo-grid", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Target of the `page` command.
#[derive(Clone, Debug)]
enum PageMove {
    Next,
    Prev,
    To(usize),
}

impl FromStr for PageMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            n => match n.parse::<usize>() {
                Ok(page) if page >= 1 => Ok(Self::To(page - 1)),
                _ => Err(format!("expected next, prev or a page number, got '{n}'")),
            },
        }
    }
}

/// A 1-based page and slot as typed by the user.
#[derive(clap::Args, Clone)]
struct SlotArgs {
    /// Page number, starting at 1
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    /// Slot number on the page, starting at 1
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    slot: u32,
}

impl SlotArgs {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.page as usize - 1, self.slot as usize - 1)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Add photo files, or every supported photo under a folder
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Place a photo in a specific slot
    Assign {
        #[command(flatten)]
        at: SlotArgs,
        photo: PathBuf,
    },
    /// Clear a slot
    Remove {
        #[command(flatten)]
        at: SlotArgs,
    },
    /// Set the caption of a populated slot
    Caption {
        #[command(flatten)]
        at: SlotArgs,
        text: String,
    },
    /// Set a page title
    Title {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        text: String,
    },
    /// Switch grid layout, re-flowing every photo
    Layout { mode: LayoutMode },
    /// Change the caption prefix and renumber all captions
    Prefix { text: String },
    /// Move to the next, previous or a numbered page
    Page { to: PageMove },
    /// Preview the current page
    Show,
    /// Write the document as a PDF
    Export {
        /// File name, without extension (default: photo_grid_<timestamp>)
        #[arg(long)]
        name: Option<String>,
        /// Output directory
        #[arg(long, default_value = "Documents")]
        out_dir: PathBuf,
    },
    /// Forget all photos, assignments and titles
    Reset,
    /// Print a stock settings.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut settings = config::load_settings(&cli.config_dir)?;
    let mut session = project::load_project(&cli.project, &settings)?;

    match cli.command {
        Command::Add { paths } => {
            let (photos, folder) = collect_photos(&paths)?;
            let added = session.add_photos(photos);
            session.fill_gaps();
            if let Some(folder) = folder {
                settings.last_folder = folder.display().to_string();
                config::save_settings(&cli.config_dir, &settings)?;
            }
            println!("Added {} photos", added);
            println!("{}", output::format_overview(&session));
        }
        Command::Assign { at, photo } => {
            let photo = PhotoRef::new(std::path::absolute(&photo)?);
            session.add_photos([photo.clone()]);
            session.assign(at.coordinate(), photo)?;
            println!("{}", output::format_overview(&session));
        }
        Command::Remove { at } => match session.remove(at.coordinate())? {
            Some(photo) => println!("Removed {} from {}", photo.name(), at.coordinate()),
            None => println!("{} was already empty", at.coordinate()),
        },
        Command::Caption { at, text } => {
            if !session.set_caption(at.coordinate(), text)? {
                return Err(format!("{} holds no photo", at.coordinate()).into());
            }
        }
        Command::Title { page, text } => {
            session.set_title(page as usize - 1, text);
        }
        Command::Layout { mode } => {
            if session.set_layout(mode) {
                println!("Layout set to {}", mode);
            }
            settings.layout = mode;
            config::save_settings(&cli.config_dir, &settings)?;
        }
        Command::Prefix { text } => {
            if session.set_prefix(&text) {
                settings.caption.prefix = session.caption_prefix().to_string();
                config::save_settings(&cli.config_dir, &settings)?;
                println!("Caption prefix set to \"{}\"", session.caption_prefix());
            }
        }
        Command::Page { to } => {
            let page = match to {
                PageMove::Next => session.step_page(1),
                PageMove::Prev => session.step_page(-1),
                PageMove::To(page) => session.go_to_page(page),
            };
            let slots = session.preview_page(page);
            output::print_page(&session, page, &slots);
        }
        Command::Show => {
            let page = session.current_page();
            let slots = session.preview_page(page);
            output::print_page(&session, page, &slots);
        }
        Command::Export { name, out_dir } => {
            std::fs::create_dir_all(&out_dir)?;
            let target = out_dir.join(export_file_name(name.as_deref()));
            init_thread_pool(&settings.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_render_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = render::render(
                &mut session,
                &settings,
                &RustBackend::new(),
                &mut PdfWriter::default(),
                &target,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_summary(&result?, &target);
        }
        Command::Reset => {
            session.reset();
            println!("Project cleared");
        }
        Command::GenConfig => {}
    }

    project::save_project(&cli.project, &session)?;
    Ok(())
}

/// Expand files and folders into absolute photo paths.
///
/// Folders are walked recursively in file-name order; unsupported files are
/// skipped. Also returns the folder to remember as `last_folder`.
fn collect_photos(
    paths: &[PathBuf],
) -> Result<(Vec<PhotoRef>, Option<PathBuf>), Box<dyn std::error::Error>> {
    let mut photos = Vec::new();
    let mut folder = None;
    for path in paths {
        let path = std::path::absolute(path)?;
        if path.is_dir() {
            for entry in WalkDir::new(&path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_supported_image(entry.path()) {
                    photos.push(PhotoRef::new(entry.path()));
                }
            }
            folder = Some(path);
        } else if is_supported_image(&path) {
            folder = path.parent().map(Path::to_path_buf);
            photos.push(PhotoRef::new(path));
        } else {
            tracing::warn!(path = %path.display(), "skipping unsupported file");
        }
    }
    Ok((photos, folder))
}

/// `<name>.pdf`, where a `.pdf` the user already typed is not doubled and a
/// missing name becomes a timestamp.
fn export_file_name(name: Option<&str>) -> String {
    let stem = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n
            .strip_suffix(".pdf")
            .or_else(|| n.strip_suffix(".PDF"))
            .unwrap_or(n)
            .to_string(),
        None => chrono::Local::now()
            .format("photo_grid_%Y%m%d_%H%M%S")
            .to_string(),
    };
    format!("{stem}.pdf")
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
