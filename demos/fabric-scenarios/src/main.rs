mod scenarios;

use std::io::Write;

use clap::Parser;
use env_logger::Builder;

const NAMES: &[&str] = &["s1", "s2", "s3", "s4", "s5", "s6"];

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
/// Runs the named offloading scenarios and prints their outcomes.
struct Args {
    /// Run a single scenario (s1..s6); runs all of them if omitted.
    #[clap(short, long)]
    scenario: Option<String>,
}

fn main() {
    Builder::from_default_env().format(|buf, record| writeln!(buf, "{}", record.args())).init();

    let args = Args::parse();
    let names: Vec<&str> = match &args.scenario {
        Some(name) => vec![name.as_str()],
        None => NAMES.to_vec(),
    };

    for name in names {
        let summary = match name {
            "s1" => scenarios::s1_happy_path(),
            "s2" => scenarios::s2_duplicate_id(),
            "s3" => scenarios::s3_congestion(),
            "s4" => scenarios::s4_buffering_and_timeout(),
            "s5" => scenarios::s5_no_path(),
            "s6" => scenarios::s6_idle_energy(),
            other => panic!("unknown scenario `{other}`, expected one of {NAMES:?}"),
        };
        println!("{name}: {summary}");
    }
}
