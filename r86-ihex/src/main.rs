extern crate r86_ihex;

use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::task;

use r86_ihex::cli::{self, Loaded, Mode, Options, Settings};
use r86_ihex::cli::utils::{self, Bar, Spinner};

async fn decode_all(inputs: &[PathBuf], settings: Settings) -> Result<Vec<Option<Loaded>>, Box<dyn Error>> {
    let mut bar = Bar::spawn("Decoding images...", inputs.len() as u64);

    let handles: Vec<_> = inputs.iter()
        .cloned()
        .map(|path| task::spawn_blocking(move || {
            let loaded = cli::load_file(&path, settings.decoder);
            (path, loaded)
        }))
        .collect();

    let mut images = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for (done, handle) in handles.into_iter().enumerate() {
        let (path, loaded) = handle.await?;
        match loaded {
            Ok(loaded) => images.push(Some(loaded)),
            Err(e) => {
                images.push(None);
                failures.push((path, e));
            }
        }
        bar.progress(done as u64 + 1);
    }
    bar.finish().await;

    for (path, e) in &failures {
        utils::report_error(path, e);
    }

    Ok(images)
}

fn finalize(path: &Path, loaded: &mut Loaded, settings: Settings) -> bool {
    if settings.verbose > 0 {
        for record in &loaded.unknown {
            utils::report_unknown(path, record);
        }
    }

    if let Some(size) = settings.size {
        if let Err(range) = loaded.image.pad_to(size) {
            utils::error("Error:", format!(
                "`{}` spans {} bytes, more than the {} bytes allowed.",
                path.display(), range.end, size
            ));
            return false;
        }
    }

    if settings.verbose > 1 {
        utils::info("Decoded:", format!("`{}`, {} byte(s).", path.display(), loaded.image.len()));
    }
    true
}

fn write_image(directory: &Path, input: &Path, loaded: &Loaded) -> std::io::Result<PathBuf> {
    let destination = cli::output_path(directory, input);
    let mut file = File::create(&destination)?;
    file.write_all(loaded.image.as_ref())?;
    Ok(destination)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let (inputs, mode, settings) = Options::from_command_line().into_parts();

    match mode {
        Mode::Check => utils::info("Mode:", "check only"),
        Mode::Convert { ref directory } => utils::info("Mode:", format!("convert into `{}`", directory.display()))
    }

    let mut images = decode_all(&inputs, settings).await?;
    let mut failed = images.iter().filter(|i| i.is_none()).count();

    for (path, loaded) in inputs.iter().zip(images.iter_mut()) {
        if let Some(image) = loaded {
            if !finalize(path, image, settings) {
                *loaded = None;
                failed += 1;
            }
        }
    }

    if let Mode::Convert { directory } = mode {
        let spinner = Spinner::spawn("Writing images...");
        let written = fs::create_dir_all(&directory).map(|_| {
            inputs.iter()
                .zip(images.iter())
                .filter_map(|(path, loaded)| loaded.as_ref().map(|l| (path, l)))
                .map(|(path, loaded)| (path, write_image(&directory, path, loaded)))
                .collect::<Vec<_>>()
        });
        spinner.finish().await;

        match written {
            Ok(written) => for (path, result) in written {
                match result {
                    Ok(destination) if settings.verbose > 1 => utils::info("Written:", format!("`{}`", destination.display())),
                    Ok(_) => {},
                    Err(e) => {
                        utils::error("Error:", format!("cannot write image of `{}`: {}", path.display(), e));
                        failed += 1;
                    }
                }
            },
            Err(e) => {
                utils::error("Error:", format!("cannot create `{}`: {}", directory.display(), e));
                failed = inputs.len();
            }
        }
    }

    if failed > 0 {
        utils::error("Error:", format!("{} of {} image(s) failed.", failed, inputs.len()));
        std::process::exit(1);
    }

    utils::success("Success!", format!("{} image(s) decoded.", inputs.len()));
    Ok(())
}
