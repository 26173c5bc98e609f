// serlink - point-to-point serial command/response tool
use clap::Parser;
use serlink::cli::output::ConsoleWriter;
use serlink::cli::{execute_command, Args, OutputWriter};

fn main() {
    let args = Args::parse();
    let writer = ConsoleWriter::new(args.output);

    if let Err(e) = execute_command(args) {
        if writer.write_error(&e.to_string()).is_err() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
