//! hfskit
//!
//! Command line front end for inspecting and modifying HFS disk images.

use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use hfskit::config;
use hfskit::volume::{CopyMode, Hfs, ItemRecord, VolumeSession};

mod cli;

use cli::{Cli, Commands};

/// `exists` found nothing at the path
const EXIT_NOT_FOUND: u8 = 1;

/// Any failure, kept apart from `EXIT_NOT_FOUND` so scripts can tell them apart
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("hfskit: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut app_config = config::get_config().clone();
    if let Some(dir) = cli.tool_dir {
        app_config.engine.tool_dir = Some(dir);
    }
    let hfs = Hfs::from_config(&app_config);
    let image = cli.image.as_path();

    match cli.command {
        Commands::Format { name } => {
            hfs.format_existing(image, &name)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::New { name, size } => {
            hfs.format_new(image, &name, size)?;
            Ok(ExitCode::SUCCESS)
        }
        command => hfs.with_mounted(image, |session| run_mounted(session, command)),
    }
}

fn run_mounted(session: &mut VolumeSession<'_>, command: Commands) -> Result<ExitCode, Box<dyn Error>> {
    let volume = session.require_mounted()?.clone();

    match command {
        Commands::Info => {
            println!("Name:     {}", volume.name);
            println!("Created:  {}", volume.created_ctime);
            println!("Modified: {}", volume.modified_ctime);
            println!("Free:     {} bytes", volume.bytes_free);
        }
        Commands::Ls { path } => {
            let dir = path.unwrap_or_else(|| format!("{}:", volume.name));
            for item in session.list(Some(dir.as_str()))? {
                print_item(&item);
            }
        }
        Commands::Stat { path } => print_item(&session.stat(&path)?),
        Commands::Exists { path } => {
            return Ok(exists_exit_code(session.exists(&path)?));
        }
        Commands::Put {
            source,
            target,
            mode,
        } => put(session, &source, &target, mode)?,
        Commands::Rm { path } => session.delete(&path)?,
        Commands::Mkdir { path } => session.mkdir(&path)?,
        Commands::Format { .. } | Commands::New { .. } => {
            return Err("formatting works on the image, not a mounted volume".into())
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn put(
    session: &VolumeSession<'_>,
    source: &Path,
    target: &str,
    mode: Option<CopyMode>,
) -> Result<(), Box<dyn Error>> {
    if source == Path::new("-") {
        let mut stdin = io::stdin().lock();
        match mode {
            Some(mode) => session.copy_in_from_reader_with_mode(&mut stdin, target, mode)?,
            None => session.copy_in_from_reader(&mut stdin, target)?,
        }
        return Ok(());
    }

    // Fail early with a host-side error rather than whatever hcopy prints
    File::open(source)?;
    match mode {
        Some(mode) => session.copy_in_with_mode(source, target, mode)?,
        None => session.copy_in(source, target)?,
    }
    Ok(())
}

fn print_item(item: &ItemRecord) {
    let kind = if item.is_file { 'f' } else { 'd' };
    println!(
        "{:>6} {} {}/{} {:>10} {:>10} {}  {}",
        item.id,
        kind,
        item.type_code,
        item.creator_code,
        item.data_size,
        item.rsrc_size,
        item.date_modified,
        item.name
    );
}

fn exists_exit_code(found: bool) -> ExitCode {
    if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_FOUND)
    }
}
