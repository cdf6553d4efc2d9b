#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi, fs, io, process};

use lzwgrow::{AllResult, BitOrder, Decoder, DictionaryKind, Encoder, LzwError};

fn main() -> CodingResult {
    env_logger::init();
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> Result<(), LzwError> {
    let operation = flags.operation.unwrap_or_else(explain);
    let bit_order = flags.bit_order;

    let result = match (flags.input, operation) {
        (Input::File(file), Operation::Encode) => {
            let mut encoder = Encoder::with_dictionary(bit_order, flags.dictionary);
            encoder.encode_file(&file, flags.output.as_deref())
        }
        (Input::Stdin, Operation::Encode) => {
            let input = io::BufReader::with_capacity(1 << 20, io::stdin());
            let mut encoder = Encoder::with_dictionary(bit_order, flags.dictionary);
            with_output(flags.output, |out| encoder.into_stream(out).encode_all(input))
        }
        (Input::File(file), Operation::Decode) => {
            let data = fs::File::open(&file).map_err(|source| LzwError::Open {
                path: file.clone(),
                source,
            })?;
            let input = io::BufReader::with_capacity(1 << 20, data);
            let mut decoder = Decoder::new(bit_order);
            with_output(flags.output, |out| decoder.into_stream(out).decode_all(input))
        }
        (Input::Stdin, Operation::Decode) => {
            let input = io::BufReader::with_capacity(1 << 20, io::stdin());
            let mut decoder = Decoder::new(bit_order);
            with_output(flags.output, |out| decoder.into_stream(out).decode_all(input))
        }
    };

    log::info!(
        "read {} bytes, wrote {} bytes",
        result.bytes_read,
        result.bytes_written
    );
    result.status
}

/// Run `op` against the output file, or standard output.
fn with_output(
    output: Option<PathBuf>,
    op: impl FnOnce(&mut dyn io::Write) -> AllResult,
) -> AllResult {
    match output {
        None => {
            let out = io::stdout();
            let mut out = io::BufWriter::new(out.lock());
            op(&mut out)
        }
        Some(path) => match fs::File::create(&path) {
            Ok(file) => op(&mut io::BufWriter::new(file)),
            Err(source) => AllResult {
                bytes_read: 0,
                bytes_written: 0,
                status: Err(LzwError::Open { path, source }),
            },
        },
    }
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    operation: Option<Operation>,
    bit_order: BitOrder,
    dictionary: DictionaryKind,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Operation {
    Encode,
    Decode,
}

fn explain<T>() -> T {
    println!(
        "Usage: lzw [-e|-d] [-o <output>] <file>\n\
        Arguments:\n\
        -e\t operation encode\n\
        -d\t operation decode\n\
        -o\t output file, standard output if omitted\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            output: None,
            operation: None,
            bit_order: BitOrder::Msb,
            dictionary: DictionaryKind::Tree,
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress with growing LZW code words, or decompress such data")
        .arg(
            clap::Arg::new("decode")
                .short('d')
                .long("decode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("encode")
                .short('e')
                .long("encode")
                .action(clap::ArgAction::SetTrue),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(["decode", "encode"])
                .multiple(false)
                .required(true),
        )
        .arg(
            clap::Arg::new("bit_order")
                .short('b')
                .long("bit-order")
                .value_parser(["l", "m", "least", "most"]),
        )
        .arg(
            clap::Arg::new("dictionary")
                .long("dictionary")
                .default_value("tree")
                .value_parser(["tree", "hash"]),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args.by_ref());

        if matches.get_flag("decode") {
            flags.operation = Some(Operation::Decode);
        } else if matches.get_flag("encode") {
            flags.operation = Some(Operation::Encode);
        }

        match matches.get_one::<String>("bit_order").map(String::as_str) {
            Some("m") | Some("most") => flags.bit_order = BitOrder::Msb,
            Some("l") | Some("least") => flags.bit_order = BitOrder::Lsb,
            Some(_) => unreachable!("unparsed bit order"),
            None => {}
        }

        match matches.get_one::<String>("dictionary").map(String::as_str) {
            Some("tree") => flags.dictionary = DictionaryKind::Tree,
            Some("hash") => flags.dictionary = DictionaryKind::Hashed,
            Some(_) => unreachable!("unparsed dictionary"),
            None => {}
        }

        flags.output = matches.get_one::<PathBuf>("output").cloned();

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(LzwError),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), LzwError>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
