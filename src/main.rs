mod cli;
mod config;
mod document;
mod form_file;
mod macros;
mod markup;
mod model;
mod pdf;
mod pipeline;
mod share;
mod storage;

use std::{error::Error, path::PathBuf, process};

use chrono::Local;
use clap::Parser;
use log::{debug, error};
use model::{DocumentKind, DocumentRequest, FormModel};
use pipeline::{GenerateError, GenerateResult, Generator, Notice};
use storage::FsStorage;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(bin_name = env!("CARGO_BIN_NAME"))]
enum Cli {
    #[command(about = "Prints tool version")]
    #[command(long_about = None)]
    Version,

    #[command(about = "Fill in a form and create a PDF document")]
    #[command(long_about = None)]
    Create(CreateArgs),

    #[command(about = "Create a PDF document from a form file")]
    #[command(long_about = None)]
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct CreateArgs {
    #[arg(short='c', long, default_value=Some("./config.toml"))]
    config_path: PathBuf,

    #[arg(short, long, value_enum)]
    kind: Option<DocumentKind>,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(short='c', long, default_value=Some("./config.toml"))]
    config_path: PathBuf,

    #[arg(short, long, value_enum, default_value_t = DocumentKind::Bill)]
    kind: DocumentKind,

    /// Print document markup instead of creating a PDF.
    #[arg(long)]
    markup: bool,

    #[arg(long)]
    form: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match Cli::parse() {
        Cli::Version => {
            println!(env!("CARGO_PKG_VERSION"));
        }
        Cli::Create(args) => {
            debug!("Подгружаем конфиг из {:?}", args.config_path);
            let cfg = config::load(args.config_path)?;

            let kind = match args.kind {
                Some(k) => k,
                None => cli::ask_kind()?,
            };
            let request = kind.request();

            println!("{}", request.form_title);

            let form = FormModel::new(Local::now().date_naive(), cfg.mobile_prefix.clone());
            let form = cli::ask(form)?;

            let generator = build_generator(&cfg)?;
            let result = generator.generate(&form, &request);
            let result = retry_storage(&generator, result, &request)?;

            report(result);
        }
        Cli::Render(args) => {
            debug!("Подгружаем конфиг из {:?}", args.config_path);
            let cfg = config::load(args.config_path)?;

            debug!("Подгружаем форму из {:?}", args.form);
            let form = form_file::load(&args.form, &cfg.mobile_prefix)?;
            let request = args.kind.request();

            let generator = build_generator(&cfg)?;

            if args.markup {
                let (_, markup) = generator.markup(&form, &request);
                print!("{}", markup);
                return Ok(());
            }

            report(generator.generate(&form, &request));
        }
    };

    Ok(())
}

fn build_generator(cfg: &config::Config) -> Result<Generator, pdf::RenderError> {
    let renderer = pdf::TypstRenderer::load(&cfg.font_paths)?;

    Ok(Generator::new(
        Box::new(renderer),
        Box::new(FsStorage::new(cfg.output_dir.clone(), cfg.file_naming)),
        cfg.share.sharer(),
        cfg.file_naming,
        cfg.date_format.clone(),
    ))
}

/// Если PDF отрендерился, но не сохранился, предлагаем повторить сохранение.
fn retry_storage(
    generator: &Generator,
    result: GenerateResult,
    request: &DocumentRequest,
) -> anyhow::Result<GenerateResult<PathBuf>> {
    let mut result = result.map(|g| {
        debug!("Сформирован документ {:?}", g.document);
        g.path
    });

    loop {
        let pdf = match result {
            Err(GenerateError::Storage { pdf, source }) => {
                error!("PDF storage error: {:?}", source);

                let again = inquire::Confirm::new("Saving failed. Retry?")
                    .with_default(true)
                    .prompt()?;
                if !again {
                    return Ok(Err(GenerateError::Storage { pdf, source }));
                }
                pdf
            }
            other => return Ok(other),
        };

        result = generator.store_and_share(pdf, request);
    }
}

/// Показывает пользователю итог формирования.
/// При ошибке завершает процесс с ненулевым кодом.
fn report<T>(result: GenerateResult<T>) {
    let notice = Notice::from(&result);

    println!("{}", notice);

    if let Err(e) = result {
        error!("PDF generation error: {:?}", anyhow::Error::new(e));
        process::exit(1);
    }
}
