use clap::Parser;
use env_logger::Env;
use umi_prep::{cli, commands, config::Config};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();

    let result = Config::resolve(args.config.as_deref()).and_then(|config| match args.command {
        cli::Commands::Extract {
            out_dir,
            name,
            fastq1,
            fastq2,
            read1_tag,
            read2_tag,
        } => commands::extract::run(out_dir, name, fastq1, fastq2, read1_tag, read2_tag, &config),
        cli::Commands::Group { umi_counts } => commands::group::run(umi_counts, &config),
        cli::Commands::Summarize {
            bam_files,
            output_file,
            reference_file,
        } => commands::summarize::run(bam_files, output_file, reference_file, &config),
        cli::Commands::Prepare {
            sample_sheet,
            data_dir,
            out_dir,
        } => commands::prepare::run(sample_sheet, data_dir, out_dir, &config),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
