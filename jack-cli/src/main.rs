//! Entrypoint for CLI
mod conf;
mod error;

use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use jack::{
    lex::{Lexer, TokenKind},
    IMPL_VERSION,
};
use log::{error, info, warn};

use self::{
    conf::{CliConf, CONF_FILE},
    error::AppError,
};

static USAGE: &str = r#"
usage: jackc CMD PATH

commands:
    build   Compile a .jack file, or every .jack file in a directory, into .vm files
    trace   Like build, and also write the parse trace of each file to .xml
    tokens  Print the tokens of a .jack file

configuration:
    An optional jackc.yaml in the working directory can set
        trace: true
        out_dir: <directory>

examples:
    jackc build Square/
    jackc trace Square/Main.jack
    jackc tokens Square/Main.jack
"#;

fn run_compiler(path: impl AsRef<Path>, conf: CliConf) -> Result<(), AppError> {
    let path = path.as_ref();
    let sources = collect_sources(path)?;
    if sources.is_empty() {
        warn!("no .jack files in {}", path.display());
    }

    if let Some(out_dir) = &conf.out_dir {
        fs::create_dir_all(out_dir)?;
    }

    // A broken file doesn't stop the others from compiling.
    let mut failed = 0;
    for source_path in &sources {
        let start = Instant::now();
        match compile_file(source_path, &conf) {
            Ok(out_path) => info!(
                "{} -> {} ({}ms)",
                source_path.display(),
                out_path.display(),
                start.elapsed().as_nanos() as f64 / 1000000.0
            ),
            Err(err) => {
                error!("{}: {}", source_path.display(), err.kind);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(AppError::failed(failed));
    }

    Ok(())
}

/// Compile one source file, returning the path of the written `.vm` file.
fn compile_file(source_path: &Path, conf: &CliConf) -> Result<PathBuf, AppError> {
    let file_bytes = fs::read(source_path)?;
    let source_code = String::from_utf8(file_bytes)?;

    let compiled = jack::compile_with(&source_code, conf.jack.clone())?;

    let stem = source_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(compiled.name.as_str());
    if stem != compiled.name {
        warn!(
            "{} declares class {}, expected {stem}",
            source_path.display(),
            compiled.name
        );
    }

    let out_dir = match &conf.out_dir {
        Some(out_dir) => out_dir.clone(),
        None => source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let vm_path = out_dir.join(format!("{stem}.vm"));
    fs::write(&vm_path, compiled.vm_text())?;

    if let Some(trace) = &compiled.trace {
        fs::write(out_dir.join(format!("{stem}.xml")), trace)?;
    }

    Ok(vm_path)
}

/// A single file, or the `.jack` files directly inside a directory.
fn collect_sources(path: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() && entry_path.extension().map_or(false, |ext| ext == "jack") {
            sources.push(entry_path);
        }
    }
    // Deterministic order, whatever the file system says.
    sources.sort();

    Ok(sources)
}

fn print_tokens(filepath: impl AsRef<Path>) -> Result<(), AppError> {
    let file_bytes = fs::read(filepath.as_ref())?;
    let source_code = String::from_utf8(file_bytes)?;

    let mut lexer = Lexer::new(source_code.as_str());

    println!("line | offset | len | token                | fragment ");
    loop {
        let token = lexer.next_token();
        let line = token.line;
        let offset = token.span.index;
        let len = token.span.size;
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns

        match token.kind {
            TokenKind::EOF => println!("{line:4} {offset:7}:{len: <3} {kind}"),
            _ => {
                let fragment = token.span.fragment(lexer.source_code());
                println!("{line:4} {offset:7}:{len: <3} {kind: <22} \"{fragment}\"")
            }
        }

        if token.kind == TokenKind::EOF {
            break;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Build { path }) => run_compiler(path, CliConf::load(CONF_FILE)?)?,
        Some(Cmd::Trace { path }) => {
            let mut conf = CliConf::load(CONF_FILE)?;
            conf.jack.trace = true;
            run_compiler(path, conf)?
        }
        Some(Cmd::Tokens { filepath }) => print_tokens(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;

    match cmd.as_str() {
        "build" => Some(Cmd::Build { path: args.next()? }),
        "trace" => Some(Cmd::Trace { path: args.next()? }),
        "tokens" => Some(Cmd::Tokens {
            filepath: args.next()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("jackc v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile to VM code
    Build { path: String },
    /// Compile and write parse traces
    Trace { path: String },
    /// Dump tokens
    Tokens { filepath: String },
}
