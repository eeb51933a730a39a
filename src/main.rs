use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use mpdte_counsellor::analyzer::{EligibilityAnalyzer, EligibilityResult};
use mpdte_counsellor::export::{DocumentExporter, EligibleListDocument};
use mpdte_counsellor::loader::{self, Dataset};
use mpdte_counsellor::models::{CandidateProfile, Config, ExportFormat};
use mpdte_counsellor::{ranking, report, telemetry};
use std::path::Path;
use tracing::info;

fn cli() -> Command {
    Command::new("mpdte-counsellor")
        .version("1.0")
        .about("Finds eligible MPDTE B.Tech colleges and branches for a JEE common rank")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("FULL NAME")
                .help("Candidate name, used in the exported document")
                .default_value(""),
        )
        .arg(
            Arg::new("rank")
                .short('r')
                .long("rank")
                .value_name("CRL")
                .help("JEE common rank")
                .required(true)
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("domicile")
                .short('d')
                .long("domicile")
                .value_name("ALL|YES|NO")
                .help("MP domicile")
                .default_value("ALL"),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("ALL|UR|OBC|SC|ST")
                .help("Reservation category")
                .default_value("ALL"),
        )
        .arg(
            Arg::new("class")
                .long("class")
                .value_name("CLASS")
                .help("ALL, NIL, PH, SAINIK, FREEDOM_FIGHTER or TECHNICAL_STREAM")
                .default_value("ALL"),
        )
        .arg(
            Arg::new("institute-type")
                .short('t')
                .long("institute-type")
                .value_name("TYPE")
                .help("ALL, GOVERNMENT_AIDED, GOVERNMENT_AUTONOMOUS, PRIVATE or SELF_FINANCING")
                .default_value("ALL"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Show how many options reached each eligibility stage")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("export")
                .short('e')
                .long("export")
                .help("Write the eligible list to the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("pdf|text|csv")
                .help("Export format (defaults to the configured one)"),
        )
}

fn main() -> Result<()> {
    let args = cli().get_matches();
    let config_file = args
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("invalid configuration file {}", config_file))?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        Config::default().save_to_file(config_file)?;
        println!(
            "⚠️  Please check data_file in {} points at the allotment workbook (.xlsx or .csv), then run the program again.",
            config_file
        );
        return Ok(());
    };

    telemetry::init(config.log_level.as_deref().unwrap_or("info"))?;

    let profile = build_profile(&args)?;
    let candidate_name = args
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_default();
    let format = match args.get_one::<String>("format") {
        Some(value) => value.parse::<ExportFormat>()?,
        None => config.export_format,
    };

    println!("📂 Reading allotment data from: {}", config.data_file);
    let dataset = match loader::snapshot(Path::new(&config.data_file)) {
        Ok(dataset) => dataset,
        Err(e) => {
            println!("❌ Error: {}", e);
            if e.is_unavailable() {
                println!("   Please set data_file in {} to the allotment workbook (.xlsx or .csv)", config_file);
            }
            return Err(e.into());
        }
    };
    print_dataset_summary(dataset);

    println!("\n🧑‍🎓 Candidate: {} | CRL: {}", display_name(&candidate_name), profile.rank);
    let analyzer = EligibilityAnalyzer::new(&profile);
    let EligibilityResult {
        mut matches,
        stage_counts,
    } = analyzer.analyze(dataset.records());
    info!(
        rank = profile.rank,
        matched = stage_counts.matched,
        total = stage_counts.total,
        "eligibility query complete"
    );

    if args.get_flag("debug") {
        println!("\n🛠 Debug Breakdown");
        println!("{}", report::render_stage_counts(&stage_counts));
    }

    ranking::sort_matches(&mut matches, &profile.institute_type);

    if matches.is_empty() {
        println!("\n⚠️  No eligible colleges found for the given inputs.");
    } else {
        let groups = report::group_by_institute(&matches);
        println!(
            "\n🏫 Eligible Colleges & Branches: {} options in {} institutes\n",
            matches.len(),
            groups.len()
        );
        print!("{}", report::render_groups(&groups));
    }

    if args.get_flag("export") {
        let output_dir = config.output_directory.as_deref().unwrap_or("output");
        let document = EligibleListDocument::new(&candidate_name, profile.rank, &matches);
        let path = DocumentExporter::new(output_dir)
            .export(&document, format)
            .context("failed to export eligible list")?;
        println!("📥 Eligible list saved to: {}", path.display());
    }

    if config.show_disclaimer {
        println!("\n⚠️  Eligibility based on previous-year MPDTE data. Actual allotment may vary.");
    }
    Ok(())
}

fn build_profile(args: &ArgMatches) -> Result<CandidateProfile> {
    let rank = args
        .get_one::<u32>("rank")
        .copied()
        .context("--rank is required")?;

    let mut profile = CandidateProfile::new(rank);
    profile.domicile = choice(args, "domicile").parse()?;
    profile.category = choice(args, "category").parse()?;
    profile.reservation_class = choice(args, "class").parse()?;
    profile.institute_type = choice(args, "institute-type").parse()?;
    Ok(profile)
}

fn choice<'a>(args: &'a ArgMatches, id: &str) -> &'a str {
    args.get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or("ALL")
}

fn print_dataset_summary(dataset: &Dataset) {
    println!("{}", report::render_dataset_summary(&dataset.summary()));
    if dataset.dropped_rows() > 0 {
        println!("   🔄 Skipped {} incomplete rows", dataset.dropped_rows());
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "(unnamed)"
    } else {
        name
    }
}
