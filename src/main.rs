//! BuildCo Admin CLI Entry Point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

use buildco_admin_lib::commands;
use buildco_admin_lib::config::AppConfig;
use buildco_admin_lib::domain::{ClientLogo, HeroSlide, Page, ProjectCategory};
use buildco_admin_lib::filter::ProjectFilter;
use buildco_admin_lib::sync::ChannelNotifier;
use buildco_admin_lib::AppState;

#[derive(Parser, Debug)]
#[command(name = "buildco-admin", version, about = "Content admin for the BuildCo site")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Client logo wall
    #[command(subcommand)]
    Logos(LogoCommands),
    /// Home page carousel
    #[command(subcommand)]
    Slides(SlideCommands),
    #[command(subcommand)]
    Projects(ProjectCommands),
    /// Per-page hero images
    #[command(subcommand)]
    Heroes(HeroCommands),
}

#[derive(Subcommand, Debug)]
enum LogoCommands {
    List,
    Add {
        name: String,
        image_url: String,
        #[arg(long)]
        link: Option<String>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        link: Option<String>,
    },
    Remove {
        id: Uuid,
    },
    /// Put MOVED where TARGET is
    Move {
        moved: Uuid,
        target: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum SlideCommands {
    List,
    Add {
        title: String,
        image_url: String,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long, requires = "cta_href")]
        cta_label: Option<String>,
        #[arg(long, requires = "cta_label")]
        cta_href: Option<String>,
    },
    Remove {
        id: Uuid,
    },
    Move {
        moved: Uuid,
        target: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommands {
    List {
        #[arg(long)]
        search: Option<String>,
        /// Category name or "all"
        #[arg(long)]
        category: Option<String>,
    },
    Add {
        title: String,
        #[arg(long, default_value = "residential")]
        category: ProjectCategory,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum HeroCommands {
    List,
    Set {
        page: Page,
        image_url: String,
        #[arg(long)]
        headline: Option<String>,
    },
}

fn print_logos(logos: &[ClientLogo]) {
    for logo in logos {
        println!("{:>3}  {}  {}  {}", logo.position, logo.id, logo.name, logo.image_url);
    }
}

fn print_slides(slides: &[HeroSlide]) {
    for slide in slides {
        println!("{:>3}  {}  {}", slide.position, slide.id, slide.title);
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Logos(cmd) => match cmd {
            LogoCommands::List => print_logos(&commands::list_logos(state).await?),
            LogoCommands::Add { name, image_url, link } => {
                let logo = commands::add_logo(state, name, image_url, link).await?;
                println!("{}", logo.id);
            }
            LogoCommands::Edit { id, name, image_url, link } => {
                commands::edit_logo(state, id, name, image_url, link).await?;
            }
            LogoCommands::Remove { id } => commands::remove_logo(state, id).await?,
            LogoCommands::Move { moved, target } => {
                print_logos(&commands::move_logo(state, moved, target).await?)
            }
        },
        Command::Slides(cmd) => match cmd {
            SlideCommands::List => print_slides(&commands::list_slides(state).await?),
            SlideCommands::Add { title, image_url, subtitle, cta_label, cta_href } => {
                let cta = cta_label.zip(cta_href);
                let slide = commands::add_slide(state, title, image_url, subtitle, cta).await?;
                println!("{}", slide.id);
            }
            SlideCommands::Remove { id } => commands::remove_slide(state, id).await?,
            SlideCommands::Move { moved, target } => {
                print_slides(&commands::move_slide(state, moved, target).await?)
            }
        },
        Command::Projects(cmd) => match cmd {
            ProjectCommands::List { search, category } => {
                let filter = ProjectFilter::parse(search.as_deref(), category.as_deref())
                    .map_err(|e| e.to_string())?;
                for project in commands::list_projects(state, &filter).await? {
                    let year = project.year.map(|y| y.to_string()).unwrap_or_default();
                    println!("{}  {:<14} {:>4}  {}", project.id, project.category.as_str(), year, project.title);
                }
            }
            ProjectCommands::Add { title, category, location, year } => {
                let project = commands::create_project(state, title, category, location, year).await?;
                println!("{}", project.id);
            }
            ProjectCommands::Remove { id } => commands::delete_project(state, id).await?,
        },
        Command::Heroes(cmd) => match cmd {
            HeroCommands::List => {
                for hero in commands::list_page_heroes(state).await? {
                    println!("{:<9} {}  {}", hero.page, hero.image_url, hero.headline.unwrap_or_default());
                }
            }
            HeroCommands::Set { page, image_url, headline } => {
                commands::set_page_hero(state, page, image_url, headline).await?;
            }
        },
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match rolling_logger::init_logger(&config.log_dir, "buildco-admin") {
        Ok(()) => {
            if let Some(path) = rolling_logger::log_file_path() {
                let _ = rolling_logger::info(&format!("Logging to {}", path.display()));
            }
        }
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let (notifier, mut notices) = ChannelNotifier::new();
    let state = match AppState::connect(config, Arc::new(notifier)) {
        Ok(state) => state,
        Err(e) => {
            let _ = rolling_logger::error(&format!("Store init failed: {}", e));
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&state, cli.command).await;

    let mut failed = false;
    while let Ok(notice) = notices.try_recv() {
        failed |= notice.is_error();
        eprintln!("{}", notice);
    }
    match result {
        Ok(()) if !failed => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
